//! Composition Integration Tests
//!
//! End-to-end composition through `DocumentEngine` over in-memory
//! collaborators: section order, preview vs. new, failure atomicity,
//! sanitization of hostile templates, and signature hand-off.

#[path = "../common/mod.rs"]
mod common;

mod atomicity;
mod end_to_end;
mod sanitization;
mod signature;
