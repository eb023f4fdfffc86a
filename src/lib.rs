//! Docket - document assembly and numbering
//!
//! Docket composes invoices, quotes, order forms and purchase orders from
//! stored records and externally authored templates, and
//! issues their human-readable numbers (`PO-001`, `INV-1042`).
//!
//! # Quick Start
//!
//! ```ignore
//! use docket::{ComposeRequest, DocketConfig, DocumentEngine, DocumentType};
//!
//! let engine = DocumentEngine::new(counters, templates, records, DocketConfig::default())?;
//!
//! // Nothing is allocated for a preview
//! let draft = engine.preview(&ComposeRequest::new(DocumentType::Invoice, body_id, customer_id))?;
//!
//! // Allocates INV-001, INV-002, ...
//! let doc = engine.compose_new(&ComposeRequest::new(DocumentType::Invoice, body_id, customer_id)
//!     .with_cover("cover")
//!     .with_legal("terms"))?;
//! println!("{}", doc.to_html());
//! ```
//!
//! # Architecture
//!
//! - `docket-core`: data model, errors, collaborator traits
//! - `docket-numbering`: allocator, counter store, sequence service
//! - `docket-render`: placeholder substitution and markup sanitization
//! - `docket-engine`: totals, context, composition, orchestration, config

pub use docket_core::*;
pub use docket_engine::{
    build_body, build_context, round_money, ComposeConfig, ComposeMode, ComposeRequest, ComposedDocument,
    ComposedSection, Composer, ConfigError, ConfigResult, DocketConfig, DocumentEngine, EngineError,
    EngineResult, MemoryRecordSource, MemoryTemplateStore, NumberingConfig, RenderConfig, SignaturePacket,
    Totals, CONFIG_FILE_NAME, DEFAULT_DRAFT_LABEL,
};
pub use docket_numbering::{
    allocate_next, parse_number, reconcile, AllocatedNumber, IssuedRegistry, MemoryCounterStore,
    NumberFormat, NumberFormatError, ReconciliationReport, RetryConfig, SequenceService,
};
pub use docket_render::{
    render, DateFormat, Document, InvalidDateFormat, RenderOptions, RenderedMarkup, Renderer,
    UnsafeMarkupPolicy,
};
