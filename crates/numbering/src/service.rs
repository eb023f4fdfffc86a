//! Allocation service over a counter store
//!
//! ## Allocation Sequence
//!
//! ```text
//! 1. fetch_counter()    - read the current counter
//! 2. allocate_next()    - pure: compute number and next counter
//! 3. commit_counter()   - compare-and-swap against the value read in 1
//! 4. IF conflict: back off, retry from 1 (never from 2 with a bumped value)
//! 5. claim() in the issued registry - catches non-atomic stores
//! 6. Return the number
//! ```
//!
//! Nothing is issued until step 3 succeeds. A failed retry budget returns
//! the last conflict to the caller, who may retry the whole allocation.

use crate::format::NumberFormat;
use crate::registry::{reconcile, IssuedRegistry, ReconciliationReport};
use crate::retry::RetryConfig;
use docket_core::{AllocationError, AllocationResult, CounterStore, DocumentType};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, warn};

/// A number issued by the service
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AllocatedNumber {
    /// Type the number belongs to
    pub document_type: DocumentType,
    /// Sequence value committed to the store
    pub sequence: u64,
    /// Formatted number (`PO-042`)
    pub number: String,
}

/// Issues document numbers through a counter store
#[derive(Clone)]
pub struct SequenceService {
    store: Arc<dyn CounterStore>,
    format: NumberFormat,
    retry: RetryConfig,
    registry: Arc<IssuedRegistry>,
}

impl SequenceService {
    /// Service with default retry policy
    pub fn new(store: Arc<dyn CounterStore>, format: NumberFormat) -> Self {
        Self::with_retry(store, format, RetryConfig::default())
    }

    /// Service with an explicit retry policy
    pub fn with_retry(store: Arc<dyn CounterStore>, format: NumberFormat, retry: RetryConfig) -> Self {
        Self {
            store,
            format,
            retry,
            registry: Arc::new(IssuedRegistry::new()),
        }
    }

    /// Number format in use
    pub fn format(&self) -> &NumberFormat {
        &self.format
    }

    /// Registry of numbers issued through this service
    pub fn registry(&self) -> &IssuedRegistry {
        &self.registry
    }

    /// Issue the next number for a type
    ///
    /// # Errors
    ///
    /// - `Conflict` if the retry budget ran out under contention
    /// - `Duplicate` if the store let the same value be committed twice
    /// - any error the store or the allocator returns
    pub fn allocate(&self, document_type: DocumentType) -> AllocationResult<AllocatedNumber> {
        let mut attempt = 0;
        loop {
            let current = self.store.fetch_counter(document_type)?;
            let (number, next) = self.format.allocate_next(document_type, &current)?;

            match self.store.commit_counter(&current, next) {
                Ok(()) => {
                    if let Err(e) = self.registry.claim(document_type, next.last_issued, &number) {
                        error!(
                            document_type = %document_type,
                            number = %number,
                            "Counter store committed an already issued number"
                        );
                        return Err(e);
                    }
                    debug!(
                        document_type = %document_type,
                        number = %number,
                        attempts = attempt + 1,
                        "Allocated document number"
                    );
                    return Ok(AllocatedNumber {
                        document_type,
                        sequence: next.last_issued,
                        number,
                    });
                }
                Err(AllocationError::Conflict { expected, actual, .. })
                    if attempt < self.retry.max_retries =>
                {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        document_type = %document_type,
                        expected,
                        actual,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Counter conflict, retrying allocation"
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Reconcile numbers already persisted for a type against the store
    ///
    /// Valid existing numbers are recorded in the registry so they cannot
    /// be issued again by this service.
    pub fn reconcile<'a>(
        &self,
        document_type: DocumentType,
        existing: impl IntoIterator<Item = &'a str>,
    ) -> AllocationResult<ReconciliationReport> {
        let counter = self.store.fetch_counter(document_type)?;
        let report = reconcile(&self.format, &counter, existing);
        self.registry
            .record_existing(document_type, report.sequences.iter().copied());
        if report.is_stale() {
            warn!(
                document_type = %document_type,
                last_issued = report.last_issued,
                highest = ?report.highest,
                "Counter is behind persisted document numbers"
            );
        }
        if !report.duplicates.is_empty() {
            error!(
                document_type = %document_type,
                duplicates = report.duplicates.len(),
                "Persisted documents share numbers"
            );
        }
        Ok(report)
    }
}
