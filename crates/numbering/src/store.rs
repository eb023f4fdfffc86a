//! In-memory counter store
//!
//! DashMap keyed by document type. Every read-modify-write goes through
//! `entry()`, which holds the shard's write lock for the duration, so
//! `commit_counter` is a true compare-and-swap and `fetch_and_increment`
//! is a single atomic step. Different document types never contend.

use dashmap::DashMap;
use docket_core::{AllocationError, AllocationResult, CounterStore, DocumentType, SequenceCounter};

/// Counter store held in process memory
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    counters: DashMap<DocumentType, u64>,
}

impl MemoryCounterStore {
    /// Empty store; every type starts at `last_issued == 0`
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with existing counters
    pub fn with_counters(counters: impl IntoIterator<Item = SequenceCounter>) -> Self {
        let store = Self::new();
        for c in counters {
            store.counters.insert(c.document_type, c.last_issued);
        }
        store
    }

    /// Current counters for every type that has allocated, in type order
    pub fn snapshot(&self) -> Vec<SequenceCounter> {
        let mut all: Vec<_> = self
            .counters
            .iter()
            .map(|e| SequenceCounter::at(*e.key(), *e.value()))
            .collect();
        all.sort_by_key(|c| c.document_type);
        all
    }
}

impl CounterStore for MemoryCounterStore {
    fn fetch_counter(&self, document_type: DocumentType) -> AllocationResult<SequenceCounter> {
        let last_issued = self
            .counters
            .get(&document_type)
            .map(|v| *v)
            .unwrap_or(0);
        Ok(SequenceCounter::at(document_type, last_issued))
    }

    fn commit_counter(
        &self,
        expected: &SequenceCounter,
        new: SequenceCounter,
    ) -> AllocationResult<()> {
        let document_type = expected.document_type;
        if new.document_type != document_type {
            return Err(AllocationError::Corrupt {
                document_type,
                reason: format!("commit would move counter to {}", new.document_type),
            });
        }
        if new.last_issued <= expected.last_issued {
            return Err(AllocationError::Corrupt {
                document_type,
                reason: format!(
                    "commit would move counter backwards from {} to {}",
                    expected.last_issued, new.last_issued
                ),
            });
        }

        let mut slot = self.counters.entry(document_type).or_insert(0);
        if *slot != expected.last_issued {
            return Err(AllocationError::Conflict {
                document_type,
                expected: expected.last_issued,
                actual: *slot,
            });
        }
        *slot = new.last_issued;
        Ok(())
    }

    fn fetch_and_increment(&self, document_type: DocumentType) -> AllocationResult<SequenceCounter> {
        let mut slot = self.counters.entry(document_type).or_insert(0);
        let next = slot
            .checked_add(1)
            .ok_or(AllocationError::Exhausted(document_type))?;
        *slot = next;
        Ok(SequenceCounter::at(document_type, next))
    }
}
