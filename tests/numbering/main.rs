//! Numbering Integration Tests
//!
//! Number issuance through the engine: formatting, uniqueness under real
//! thread contention, and reconciliation against persisted numbers.

#[path = "../common/mod.rs"]
mod common;

mod contention;
mod formatting;
mod reconciliation;
