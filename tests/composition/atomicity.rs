//! All-or-nothing composition
//!
//! Any failure, whichever section or collaborator causes it, returns no
//! document and leaves every counter untouched.

use crate::common::*;
use docket::{
    ComposeError, ComposeRequest, CounterStore, DocumentType, EngineError, RenderError, SectionKind,
    StoreError, Template, TemplateKind,
};

fn last_issued(t: &TestEngine, document_type: DocumentType) -> u64 {
    t.counters.fetch_counter(document_type).unwrap().last_issued
}

#[test]
fn failing_legal_fails_whole_composition() {
    let t = TestEngine::new();
    // No company on this customer; the MSA needs one
    let customer = t.add_customer(docket::Customer::new("Solo"));
    let req = ComposeRequest::new(DocumentType::Invoice, t.invoice(), customer)
        .with_cover(COVER)
        .with_legal(MSA);

    let err = t.engine.compose_new(&req).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Compose(ComposeError::SectionFailed(
            SectionKind::Legal,
            RenderError::UnresolvedVariable(ref key)
        )) if key == "customer.company"
    ));
    assert_eq!(last_issued(&t, DocumentType::Invoice), 0);
}

#[test]
fn render_errors_never_consume_numbers() {
    let t = TestEngine::new();
    let customer = t.acme();
    t.templates.insert(Template::new(
        "broken",
        "Broken cover",
        TemplateKind::CoverPage,
        "<h1>{{document.number</h1>",
    ));

    for _ in 0..5 {
        let req = ComposeRequest::new(DocumentType::Invoice, t.invoice(), customer).with_cover("broken");
        let err = t.engine.compose_new(&req).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Compose(ComposeError::SectionFailed(
                SectionKind::CoverPage,
                RenderError::MalformedPlaceholder { .. }
            ))
        ));
    }
    assert_eq!(last_issued(&t, DocumentType::Invoice), 0);

    // The first good composition still gets the first number
    let req = ComposeRequest::new(DocumentType::Invoice, t.invoice(), customer).with_cover(COVER);
    assert_eq!(t.engine.compose_new(&req).unwrap().number(), "INV-001");
}

#[test]
fn missing_collaborator_data_consumes_no_number() {
    let t = TestEngine::new();
    let customer = t.acme();

    let req = ComposeRequest::new(DocumentType::Invoice, t.invoice(), customer).with_legal("nda");
    assert!(matches!(
        t.engine.compose_new(&req),
        Err(EngineError::Store(StoreError::NotFound { what: "template", .. }))
    ));

    let req = ComposeRequest::new(DocumentType::Invoice, docket::DocumentId::new(), customer);
    assert!(matches!(
        t.engine.compose_new(&req),
        Err(EngineError::Store(StoreError::NotFound { what: "document", .. }))
    ));

    assert_eq!(last_issued(&t, DocumentType::Invoice), 0);
}

#[test]
fn limit_violation_consumes_no_number() {
    let mut config = docket::DocketConfig::default();
    config.render.limits.max_placeholders = 1;
    let t = TestEngine::with_config(config);

    let req = ComposeRequest::new(DocumentType::Invoice, t.invoice(), t.acme()).with_cover(COVER);
    let err = t.engine.compose_new(&req).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Compose(ComposeError::SectionFailed(
            SectionKind::CoverPage,
            RenderError::LimitExceeded { .. }
        ))
    ));
    assert_eq!(last_issued(&t, DocumentType::Invoice), 0);
}
