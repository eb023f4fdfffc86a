//! Collaborator traits
//!
//! The engine owns no persistence. Counters, templates, customers and
//! document bodies come from implementations of these traits, which lets
//! the in-memory stores used in tests be swapped for a database-backed
//! layer without touching the engine.
//!
//! Thread safety: all methods must be safe to call concurrently from
//! multiple threads (requires Send + Sync).

use crate::error::{AllocationError, AllocationResult, StoreResult};
use crate::records::{Customer, DocumentBody};
use crate::types::{CustomerId, DocumentId, DocumentType, SequenceCounter, Template, TemplateId};

/// Per-type sequence counter persistence
///
/// This is the only shared mutable resource in the system. Implementations
/// must make `commit_counter` a compare-and-swap and `fetch_and_increment`
/// a single atomic read-modify-write; the allocator itself is pure and
/// cannot provide either guarantee.
pub trait CounterStore: Send + Sync {
    /// Read the current counter for a type
    ///
    /// A type that has never allocated returns `last_issued == 0`.
    fn fetch_counter(&self, document_type: DocumentType) -> AllocationResult<SequenceCounter>;

    /// Replace `expected` with `new` if the stored counter still equals `expected`
    ///
    /// # Errors
    ///
    /// Returns `AllocationError::Conflict` if another writer committed first,
    /// and `AllocationError::Corrupt` if the two counters name different types
    /// or `new` does not move forward.
    fn commit_counter(
        &self,
        expected: &SequenceCounter,
        new: SequenceCounter,
    ) -> AllocationResult<()>;

    /// Atomically increment and return the new counter
    ///
    /// The default implementation loops over fetch + compare-and-swap, which
    /// is atomic exactly when `commit_counter` is. Stores with a native
    /// increment primitive should override it.
    fn fetch_and_increment(&self, document_type: DocumentType) -> AllocationResult<SequenceCounter> {
        loop {
            let current = self.fetch_counter(document_type)?;
            let next_value = current
                .last_issued
                .checked_add(1)
                .ok_or(AllocationError::Exhausted(document_type))?;
            let next = SequenceCounter::at(document_type, next_value);
            match self.commit_counter(&current, next) {
                Ok(()) => return Ok(next),
                Err(AllocationError::Conflict { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

/// Source of cover page and legal templates
pub trait TemplateStore: Send + Sync {
    /// Fetch a template by id
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no template has this id.
    fn fetch_template(&self, id: &TemplateId) -> StoreResult<Template>;
}

/// Source of customers and document bodies
pub trait RecordSource: Send + Sync {
    /// Fetch a customer by id
    fn fetch_customer(&self, id: &CustomerId) -> StoreResult<Customer>;

    /// Fetch a structured document body by id
    fn fetch_document_body(&self, id: &DocumentId) -> StoreResult<DocumentBody>;
}
