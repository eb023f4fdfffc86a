//! Document numbering for Docket
//!
//! This crate issues human-readable document numbers (`PO-001`, `INV-1042`):
//! - NumberFormat / allocate_next: the pure allocator over a counter
//! - MemoryCounterStore: in-memory counter store with atomic increment and CAS commit
//! - SequenceService: read → allocate → compare-and-swap, retried on conflict
//! - IssuedRegistry / reconcile: duplicate detection and counter reconciliation
//!
//! The allocator is pure and makes no concurrency guarantee. Exactly-once
//! issuance comes from the store's compare-and-swap; the service never
//! skips a number, each retry recomputes from a freshly read counter.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod format;
pub mod registry;
pub mod retry;
pub mod service;
pub mod store;

pub use format::{allocate_next, parse_number, NumberFormat, NumberFormatError, DEFAULT_MIN_WIDTH};
pub use registry::{reconcile, IssuedRegistry, ReconciliationReport};
pub use retry::RetryConfig;
pub use service::{AllocatedNumber, SequenceService};
pub use store::MemoryCounterStore;
