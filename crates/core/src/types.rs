//! Core types for Docket
//!
//! This module defines the foundational types:
//! - DocumentType: the four numbered document kinds
//! - SequenceCounter: last issued sequence value for one document type
//! - CustomerId / DocumentId / TemplateId: record identifiers
//! - Template: externally authored cover page or legal content
//! - SectionKind: position of a section inside a composed document

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Numbered document kinds
///
/// Each type owns an independent numbering sequence and prefix.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Sales invoice
    Invoice,
    /// Price quote
    Quote,
    /// Customer order form
    OrderForm,
    /// Purchase order issued to a supplier
    PurchaseOrder,
}

impl DocumentType {
    /// Every document type, in declaration order
    pub const ALL: [DocumentType; 4] = [
        DocumentType::Invoice,
        DocumentType::Quote,
        DocumentType::OrderForm,
        DocumentType::PurchaseOrder,
    ];

    /// Prefix used for numbers when configuration does not override it
    pub fn default_prefix(self) -> &'static str {
        match self {
            DocumentType::Invoice => "INV",
            DocumentType::Quote => "QUO",
            DocumentType::OrderForm => "OF",
            DocumentType::PurchaseOrder => "PO",
        }
    }

    /// Human readable label ("Purchase Order")
    pub fn label(self) -> &'static str {
        match self {
            DocumentType::Invoice => "Invoice",
            DocumentType::Quote => "Quote",
            DocumentType::OrderForm => "Order Form",
            DocumentType::PurchaseOrder => "Purchase Order",
        }
    }

    /// Stable snake_case name, matching the serde representation
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentType::Invoice => "invoice",
            DocumentType::Quote => "quote",
            DocumentType::OrderForm => "order_form",
            DocumentType::PurchaseOrder => "purchase_order",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown document type '{}'", s))
    }
}

/// Last issued sequence value for one document type
///
/// `last_issued` only ever increases. A type that has never allocated
/// is represented by `last_issued == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceCounter {
    /// Document type this counter numbers
    pub document_type: DocumentType,
    /// Highest sequence value handed out so far
    pub last_issued: u64,
}

impl SequenceCounter {
    /// Counter for a type that has not allocated yet
    pub fn new(document_type: DocumentType) -> Self {
        Self {
            document_type,
            last_issued: 0,
        }
    }

    /// Counter positioned at an existing value
    pub fn at(document_type: DocumentType, last_issued: u64) -> Self {
        Self {
            document_type,
            last_issued,
        }
    }
}

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random id using UUID v4
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse an id from its string form
            ///
            /// Returns None if the string is not a valid UUID.
            pub fn from_string(s: &str) -> Option<Self> {
                Uuid::parse_str(s).ok().map(Self)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Identifier of a customer record
    CustomerId
);
uuid_id!(
    /// Identifier of a stored document body
    DocumentId
);

/// Identifier of a template in the template store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateId(String);

impl TemplateId {
    /// Wrap a template id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role a template plays in a composed document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    /// Leading cover page
    CoverPage,
    /// Trailing legal terms (MSA, T&C)
    Legal,
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateKind::CoverPage => f.write_str("cover page"),
            TemplateKind::Legal => f.write_str("legal"),
        }
    }
}

/// Markup language a template is authored in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkupFormat {
    /// Restricted HTML
    #[default]
    Html,
    /// Restricted markdown
    Markdown,
}

/// Externally authored template
///
/// Owned by the template store; the engine only ever borrows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Store id
    pub id: TemplateId,
    /// Display name ("Master Services Agreement")
    pub name: String,
    /// Raw, untrusted content containing placeholders
    pub content: String,
    /// Cover page or legal
    pub kind: TemplateKind,
    /// Markup language of `content`
    #[serde(default)]
    pub format: MarkupFormat,
}

impl Template {
    /// Create an HTML template
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: TemplateKind,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: TemplateId::new(id),
            name: name.into(),
            content: content.into(),
            kind,
            format: MarkupFormat::Html,
        }
    }

    /// Set the markup format
    pub fn with_format(mut self, format: MarkupFormat) -> Self {
        self.format = format;
        self
    }
}

/// Position of a section inside a composed document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Rendered cover page template
    CoverPage,
    /// Body built from the structured document
    Body,
    /// Rendered legal template
    Legal,
}

impl SectionKind {
    /// Stable snake_case name
    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::CoverPage => "cover_page",
            SectionKind::Body => "body",
            SectionKind::Legal => "legal",
        }
    }
}

impl From<TemplateKind> for SectionKind {
    fn from(kind: TemplateKind) -> Self {
        match kind {
            TemplateKind::CoverPage => SectionKind::CoverPage,
            TemplateKind::Legal => SectionKind::Legal,
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
