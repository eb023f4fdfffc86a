//! Core types and traits for Docket
//!
//! This crate defines the foundational types used throughout the system:
//! - DocumentType / SequenceCounter: per-type numbering state
//! - Template / TemplateKind / MarkupFormat: externally authored sections
//! - Customer / DocumentBody: already-fetched records the engine reads
//! - VariableContext: the key → value mapping placeholders resolve against
//! - Error taxonomy: allocation, render, compose and store errors
//! - Traits: collaborator seams (CounterStore, TemplateStore, RecordSource)
//! - Limits: bounds enforced by the renderer

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod error;
pub mod limits;
pub mod records;
pub mod traits;
pub mod types;

pub use context::{ContextValue, VariableContext};
pub use error::{
    AllocationError, AllocationResult, ComposeError, ComposeResult, RenderError, RenderResult,
    StoreError, StoreResult,
};
pub use limits::{RenderLimits, MAX_NESTING_DEPTH};
pub use records::{Address, Customer, DocumentBody, Discount, LineItem};
pub use traits::{CounterStore, RecordSource, TemplateStore};
pub use types::{
    CustomerId, DocumentId, DocumentType, MarkupFormat, SectionKind, SequenceCounter, Template,
    TemplateId, TemplateKind,
};
