//! Document assembly engine for Docket
//!
//! This crate turns stored records into finished documents:
//! - Totals / build_context: figures and the variable context templates read
//! - build_body: the body section, built from structured data
//! - Composer: cover page, body and legal section in fixed order
//! - DocumentEngine: fetch from collaborators, allocate, compose
//! - SignaturePacket: hand-off to an e-signature provider
//! - DocketConfig: `docket.toml`
//!
//! Only `DocumentEngine` logs; everything below it is pure.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod body;
pub mod composer;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod signature;
pub mod stores;
pub mod totals;

pub use body::build_body;
pub use composer::{ComposeMode, ComposedDocument, ComposedSection, Composer, DEFAULT_DRAFT_LABEL};
pub use config::{
    ComposeConfig, ConfigError, ConfigResult, DocketConfig, NumberingConfig, RenderConfig, CONFIG_FILE_NAME,
};
pub use context::build_context;
pub use engine::{ComposeRequest, DocumentEngine};
pub use error::{EngineError, EngineResult};
pub use signature::SignaturePacket;
pub use stores::{MemoryRecordSource, MemoryTemplateStore};
pub use totals::{round_money, Totals};
