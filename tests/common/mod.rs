//! Shared test utilities for all integration test suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from any test's main.rs.

#![allow(dead_code)]

use chrono::NaiveDate;
use docket::{
    Customer, CustomerId, DocketConfig, DocumentBody, DocumentEngine, DocumentId, DocumentType,
    LineItem, MarkupFormat, MemoryCounterStore, MemoryRecordSource, MemoryTemplateStore, Template,
    TemplateKind,
};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::{Arc, Once};

// ============================================================================
// Initialization
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Route `tracing` output through the test harness at INFO and above.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::INFO)
            .try_init();
    });
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ============================================================================
// Templates
// ============================================================================

pub const COVER: &str = "cover";
pub const TERMS: &str = "terms";
pub const MSA: &str = "msa";

pub fn cover_template() -> Template {
    Template::new(
        COVER,
        "Cover page",
        TemplateKind::CoverPage,
        "<h1>{{document.type}} {{document.number}}</h1>\
         <p>Prepared for <strong>{{customer.name}}</strong> on {{document.issue_date}}</p>",
    )
}

pub fn terms_template() -> Template {
    Template::new(
        TERMS,
        "Terms and conditions",
        TemplateKind::Legal,
        "## Terms\n\nPayment of **{{document.currency}} {{totals.total}}** is due by {{document.due_date}}.\n\n\
         1. Late payments accrue interest\n2. Disputes go to arbitration",
    )
    .with_format(MarkupFormat::Markdown)
}

pub fn msa_template() -> Template {
    Template::new(
        MSA,
        "Master Services Agreement",
        TemplateKind::Legal,
        "<h2>Master Services Agreement</h2><p>Between Docket Ltd and {{customer.company}}.</p>",
    )
}

// ============================================================================
// TestEngine - engine over in-memory collaborators
// ============================================================================

pub struct TestEngine {
    pub engine: Arc<DocumentEngine>,
    pub counters: Arc<MemoryCounterStore>,
    pub templates: Arc<MemoryTemplateStore>,
    pub records: Arc<MemoryRecordSource>,
}

impl TestEngine {
    pub fn new() -> Self {
        Self::with_config(DocketConfig::default())
    }

    pub fn with_config(config: DocketConfig) -> Self {
        init_tracing();
        let counters = Arc::new(MemoryCounterStore::new());
        let templates = Arc::new(MemoryTemplateStore::with_templates([
            cover_template(),
            terms_template(),
            msa_template(),
        ]));
        let records = Arc::new(MemoryRecordSource::new());
        let engine = DocumentEngine::new(counters.clone(), templates.clone(), records.clone(), config)
            .expect("valid config");
        Self {
            engine: Arc::new(engine),
            counters,
            templates,
            records,
        }
    }

    pub fn add_customer(&self, customer: Customer) -> CustomerId {
        let id = customer.id;
        self.records.insert_customer(customer);
        id
    }

    pub fn add_body(&self, body: DocumentBody) -> DocumentId {
        let id = body.id;
        self.records.insert_body(body);
        id
    }

    /// Customer with company and email
    pub fn acme(&self) -> CustomerId {
        self.add_customer(
            Customer::new("Jane Doe")
                .with_company("Acme Ltd")
                .with_email("jane@acme.example"),
        )
    }

    /// Unnumbered invoice with two lines, 10% discount and 20% tax
    pub fn invoice(&self) -> DocumentId {
        self.add_body(invoice_body())
    }

    /// Unnumbered body of any type with one line
    pub fn body_of(&self, document_type: DocumentType) -> DocumentId {
        self.add_body(
            DocumentBody::new(document_type, date(2024, 3, 1), "USD")
                .with_line(LineItem::new("Service", Decimal::ONE, dec("100.00"))),
        )
    }
}

pub fn invoice_body() -> DocumentBody {
    let mut body = DocumentBody::new(DocumentType::Invoice, date(2024, 3, 1), "EUR")
        .with_line(LineItem::new("Consulting", dec("1.5"), dec("120.00")))
        .with_line(LineItem::new("Licence", dec("2"), dec("19.99")));
    body.due_date = Some(date(2024, 3, 31));
    body.discount = Some(docket::Discount::Percent(dec("10")));
    body.tax_rate = Some(dec("20"));
    body
}
