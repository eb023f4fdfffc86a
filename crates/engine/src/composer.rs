//! Document composer
//!
//! ## Composition
//!
//! ```text
//! 1. check()            - body type and template slots
//! 2. number             - Preview: body number or draft label
//!                         New:     allocate from the sequence service
//! 3. build_context()    - customer / document / totals, document.number bound
//! 4. cover page         - rendered from its template (if supplied)
//! 5. body               - built from structured data
//! 6. legal              - rendered from its template (if supplied)
//! ```
//!
//! Sections come out in the fixed order `[cover, body, legal]`. The first
//! section that fails aborts the composition; no partial document is
//! returned. Composition has no side effects apart from the allocation in
//! step 2 under `New`.

use crate::body::build_body;
use crate::context::build_context;
use crate::totals::Totals;
use docket_core::{
    ComposeError, ComposeResult, Customer, DocumentBody, DocumentType, SectionKind, Template, TemplateKind,
};
use docket_numbering::SequenceService;
use docket_render::{RenderOptions, RenderedMarkup, Renderer};
use sha2::{Digest, Sha256};

/// Label bound to `document.number` when previewing an unnumbered draft
pub const DEFAULT_DRAFT_LABEL: &str = "DRAFT";

/// One rendered section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedSection {
    /// Which slot the section fills
    pub kind: SectionKind,
    /// Sanitized markup
    pub markup: RenderedMarkup,
}

/// Ordered, fully rendered document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedDocument {
    document_type: DocumentType,
    number: String,
    draft: bool,
    sections: Vec<ComposedSection>,
}

impl ComposedDocument {
    /// Document type
    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    /// Number the sections were rendered with (the draft label for drafts)
    pub fn number(&self) -> &str {
        &self.number
    }

    /// True if rendered with the draft label instead of an issued number
    pub fn is_draft(&self) -> bool {
        self.draft
    }

    /// Sections in order
    pub fn sections(&self) -> &[ComposedSection] {
        &self.sections
    }

    /// Section kinds in order
    pub fn kinds(&self) -> Vec<SectionKind> {
        self.sections.iter().map(|s| s.kind).collect()
    }

    /// Markup of one section, if present
    pub fn section(&self, kind: SectionKind) -> Option<&RenderedMarkup> {
        self.sections.iter().find(|s| s.kind == kind).map(|s| &s.markup)
    }

    /// All sections joined into one HTML fragment
    pub fn to_html(&self) -> String {
        self.sections
            .iter()
            .map(|s| s.markup.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Lowercase hex SHA-256 of `to_html()`
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.to_html().as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// How the document number is obtained
#[derive(Clone, Copy)]
pub enum ComposeMode<'a> {
    /// Use the body's number, or the draft label; nothing is allocated
    Preview,
    /// Allocate the next number before any section renders
    New(&'a SequenceService),
}

/// Composes cover page, body and legal sections
#[derive(Debug, Clone)]
pub struct Composer {
    renderer: Renderer,
    draft_label: String,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl Composer {
    /// Composer rendering with the given options
    pub fn new(options: RenderOptions) -> Self {
        Composer {
            renderer: Renderer::new(options),
            draft_label: DEFAULT_DRAFT_LABEL.to_string(),
        }
    }

    /// Replace the draft label
    pub fn with_draft_label(mut self, label: impl Into<String>) -> Self {
        self.draft_label = label.into();
        self
    }

    /// Draft label in use
    pub fn draft_label(&self) -> &str {
        &self.draft_label
    }

    /// Renderer in use
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Compose a document
    ///
    /// # Errors
    ///
    /// - `TypeMismatch` / `TemplateKindMismatch` for inconsistent inputs
    /// - `AlreadyNumbered` for `New` on a numbered body
    /// - `Allocation` if the sequence service fails
    /// - `SectionFailed` for the first section that fails to render
    pub fn compose(
        &self,
        mode: ComposeMode<'_>,
        document_type: DocumentType,
        body: &DocumentBody,
        customer: &Customer,
        cover: Option<&Template>,
        legal: Option<&Template>,
    ) -> ComposeResult<ComposedDocument> {
        self.check(document_type, body, cover, legal)?;

        let (number, draft) = match (mode, &body.number) {
            (ComposeMode::Preview, Some(number)) => (number.clone(), false),
            (ComposeMode::Preview, None) => (self.draft_label.clone(), true),
            (ComposeMode::New(_), Some(number)) => return Err(ComposeError::AlreadyNumbered(number.clone())),
            (ComposeMode::New(service), None) => (service.allocate(document_type)?.number, false),
        };

        let mut composed = self.compose_numbered(document_type, body, customer, cover, legal, &number)?;
        composed.draft = draft;
        Ok(composed)
    }

    /// Validate the inputs without rendering anything
    pub fn check(
        &self,
        document_type: DocumentType,
        body: &DocumentBody,
        cover: Option<&Template>,
        legal: Option<&Template>,
    ) -> ComposeResult<()> {
        if body.document_type != document_type {
            return Err(ComposeError::TypeMismatch {
                expected: document_type,
                actual: body.document_type,
            });
        }
        check_slot(cover, TemplateKind::CoverPage)?;
        check_slot(legal, TemplateKind::Legal)
    }

    /// Compose with an explicit number bound to `document.number`
    pub fn compose_numbered(
        &self,
        document_type: DocumentType,
        body: &DocumentBody,
        customer: &Customer,
        cover: Option<&Template>,
        legal: Option<&Template>,
        number: &str,
    ) -> ComposeResult<ComposedDocument> {
        self.check(document_type, body, cover, legal)?;

        let totals = Totals::compute(body)?;
        let context = build_context(body, customer, &totals).with_number(number);
        let mut sections = Vec::with_capacity(3);

        if let Some(template) = cover {
            let markup = self
                .renderer
                .render(template, &context)
                .map_err(|e| ComposeError::SectionFailed(SectionKind::CoverPage, e))?;
            sections.push(ComposedSection {
                kind: SectionKind::CoverPage,
                markup,
            });
        }

        let date_format = &self.renderer.options().date_format;
        sections.push(ComposedSection {
            kind: SectionKind::Body,
            markup: build_body(body, customer, &totals, number, date_format).into(),
        });

        if let Some(template) = legal {
            let markup = self
                .renderer
                .render(template, &context)
                .map_err(|e| ComposeError::SectionFailed(SectionKind::Legal, e))?;
            sections.push(ComposedSection {
                kind: SectionKind::Legal,
                markup,
            });
        }

        Ok(ComposedDocument {
            document_type,
            number: number.to_string(),
            draft: false,
            sections,
        })
    }
}

fn check_slot(template: Option<&Template>, expected: TemplateKind) -> ComposeResult<()> {
    match template {
        Some(t) if t.kind != expected => Err(ComposeError::TemplateKindMismatch {
            template: t.id.clone(),
            expected,
            actual: t.kind,
        }),
        _ => Ok(()),
    }
}
