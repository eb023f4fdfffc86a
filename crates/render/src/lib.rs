//! Template rendering for Docket
//!
//! Templates are untrusted, externally authored content. Rendering runs in
//! three steps:
//!
//! 1. **Scan**: split raw content into literals and `{{namespace.key}}` placeholders
//! 2. **Substitute**: resolve every placeholder in one pass; absent keys fail
//! 3. **Sanitize**: parse the result into the markup tree and serialize it back
//!
//! The markup tree can only represent the safe subset (paragraphs, headings,
//! tables, emphasis, breaks, rules, lists, quotes, links), so script-capable
//! constructs cannot survive step 3.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod escape;
pub mod html;
pub mod markdown;
pub mod markup;
pub mod options;
pub mod placeholder;
pub mod renderer;

pub use markup::{Block, Cell, Document, Inline, List, Row, Table};
pub use options::{DateFormat, InvalidDateFormat, RenderOptions, UnsafeMarkupPolicy};
pub use placeholder::{referenced_keys, scan, Segment};
pub use renderer::{render, RenderedMarkup, Renderer};
