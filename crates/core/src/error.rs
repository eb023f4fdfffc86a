//! Error types for Docket
//!
//! One enum per failure domain, all built with `thiserror`:
//! - AllocationError: numbering and counter store failures
//! - RenderError: placeholder, substitution and markup failures
//! - ComposeError: composition failures, wrapping the first failing section
//! - StoreError: template / record collaborator failures
//!
//! None of these are ever auto-corrected. Legal and financial text must not
//! be produced with guessed content, and a skipped number breaks the
//! ordering downstream accounting relies on.

use crate::types::{DocumentType, SectionKind, TemplateId, TemplateKind};
use thiserror::Error;

/// Result alias for numbering operations
pub type AllocationResult<T> = std::result::Result<T, AllocationError>;

/// Result alias for render operations
pub type RenderResult<T> = std::result::Result<T, RenderError>;

/// Result alias for composition
pub type ComposeResult<T> = std::result::Result<T, ComposeError>;

/// Result alias for collaborator lookups
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Numbering failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    /// Counter state is unusable (wrong type, unreadable, lost)
    #[error("counter for {document_type} is corrupt: {reason}")]
    Corrupt {
        /// Type whose counter was requested
        document_type: DocumentType,
        /// What is wrong with it
        reason: String,
    },

    /// Compare-and-swap commit found a different counter than expected
    #[error("counter conflict for {document_type}: expected last issued {expected}, found {actual}")]
    Conflict {
        /// Type being allocated
        document_type: DocumentType,
        /// `last_issued` the writer read
        expected: u64,
        /// `last_issued` the store holds now
        actual: u64,
    },

    /// No further number can be represented
    #[error("numbering sequence for {0} is exhausted")]
    Exhausted(DocumentType),

    /// The same number was handed out twice
    #[error("document number {number} was issued more than once")]
    Duplicate {
        /// The duplicated number
        number: String,
    },

    /// Counter is behind numbers already persisted
    #[error("counter for {document_type} is stale: last issued {last_issued}, highest existing {highest}")]
    Stale {
        /// Type being reconciled
        document_type: DocumentType,
        /// Counter value
        last_issued: u64,
        /// Highest number found in persisted documents
        highest: u64,
    },

    /// Text is not a number of this type
    #[error("invalid document number '{number}': {reason}")]
    InvalidNumber {
        /// Offending text
        number: String,
        /// Why it does not parse
        reason: String,
    },

    /// Counter store could not be reached
    #[error("counter store unavailable: {0}")]
    Unavailable(String),
}

/// Render failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// `{{` without a closing `}}`, or an invalid key between them
    #[error("malformed placeholder at byte {offset}: {reason}")]
    MalformedPlaceholder {
        /// Byte offset of the opening delimiter
        offset: usize,
        /// What is wrong with it
        reason: String,
    },

    /// Placeholder key is not bound in the context
    #[error("unresolved variable '{0}'")]
    UnresolvedVariable(String),

    /// Markup contained a script-capable construct and the policy is reject
    #[error("unsafe markup rejected: {0}")]
    UnsafeMarkupRejected(String),

    /// Template exceeds a render limit
    #[error("{limit} limit exceeded: {actual} > {max}")]
    LimitExceeded {
        /// Which limit
        limit: String,
        /// Configured maximum
        max: usize,
        /// Observed value
        actual: usize,
    },
}

/// Composition failures
///
/// Composition is all-or-nothing; no partial document accompanies an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    /// A template section failed to render
    #[error("{0} section failed: {1}")]
    SectionFailed(SectionKind, #[source] RenderError),

    /// Number allocation failed before any section was rendered
    #[error("numbering failed: {0}")]
    Allocation(#[from] AllocationError),

    /// A new composition was requested for a body that already has a number
    #[error("document is already numbered {0}")]
    AlreadyNumbered(String),

    /// Requested type does not match the body
    #[error("document type mismatch: requested {expected}, body is {actual}")]
    TypeMismatch {
        /// Type passed to compose
        expected: DocumentType,
        /// Type recorded on the body
        actual: DocumentType,
    },

    /// A money figure does not fit in a decimal
    #[error("totals cannot be computed: {0} overflowed")]
    Totals(&'static str),

    /// Template passed in the wrong slot
    #[error("template {template} is a {actual} template, expected {expected}")]
    TemplateKindMismatch {
        /// Template id
        template: TemplateId,
        /// Kind the slot requires
        expected: TemplateKind,
        /// Kind the template declares
        actual: TemplateKind,
    },
}

/// Collaborator lookup failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Record does not exist
    #[error("{what} not found: {id}")]
    NotFound {
        /// Record kind ("template", "customer", "document")
        what: &'static str,
        /// Requested id
        id: String,
    },

    /// Backend failure
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Shorthand for a missing record
    pub fn not_found(what: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            what,
            id: id.to_string(),
        }
    }
}
