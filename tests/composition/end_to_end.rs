//! End-to-end composition

use crate::common::*;
use docket::{ComposeError, ComposeRequest, DocumentType, EngineError, SectionKind};

fn full_request(body: docket::DocumentId, customer: docket::CustomerId) -> ComposeRequest {
    ComposeRequest::new(DocumentType::Invoice, body, customer)
        .with_cover(COVER)
        .with_legal(TERMS)
}

#[test]
fn compose_new_invoice_renders_all_sections() {
    let t = TestEngine::new();
    let req = full_request(t.invoice(), t.acme());

    let doc = t.engine.compose_new(&req).unwrap();

    assert_eq!(doc.number(), "INV-001");
    assert_eq!(
        doc.kinds(),
        vec![SectionKind::CoverPage, SectionKind::Body, SectionKind::Legal]
    );
    assert_eq!(
        doc.section(SectionKind::CoverPage).unwrap().as_str(),
        "<h1>Invoice INV-001</h1>\n<p>Prepared for <strong>Jane Doe</strong> on 2024-03-01</p>"
    );

    let body = doc.section(SectionKind::Body).unwrap().as_str();
    assert!(body.starts_with("<h1>Invoice INV-001</h1>"));
    assert!(body.contains("<tr><th>Tax (20%)</th><td>EUR 39.60</td></tr>"));
    assert!(body.contains("<strong>EUR 237.58</strong>"));

    let legal = doc.section(SectionKind::Legal).unwrap().as_str();
    assert!(legal.starts_with("<h2>Terms</h2>\n<p>Payment of <strong>EUR 237.58</strong> is due by 2024-03-31.</p>"));
    assert!(legal.ends_with("<ol><li>Late payments accrue interest</li><li>Disputes go to arbitration</li></ol>"));
}

#[test]
fn sections_follow_fixed_order_whatever_is_supplied() {
    let t = TestEngine::new();
    let customer = t.acme();

    let legal_only = ComposeRequest::new(DocumentType::Invoice, t.invoice(), customer).with_legal(MSA);
    assert_eq!(
        t.engine.preview(&legal_only).unwrap().kinds(),
        vec![SectionKind::Body, SectionKind::Legal]
    );

    let cover_only = ComposeRequest::new(DocumentType::Invoice, t.invoice(), customer).with_cover(COVER);
    assert_eq!(
        t.engine.preview(&cover_only).unwrap().kinds(),
        vec![SectionKind::CoverPage, SectionKind::Body]
    );
}

#[test]
fn preview_then_issue_then_preview() {
    let t = TestEngine::new();
    let body = t.invoice();
    let req = full_request(body, t.acme());

    let draft = t.engine.preview(&req).unwrap();
    assert!(draft.is_draft());
    assert!(draft.to_html().starts_with("<h1>Invoice DRAFT</h1>"));

    let issued = t.engine.compose_new(&req).unwrap();
    t.records.assign_number(&body, issued.number()).unwrap();

    // The stored number is shown and never reissued
    let again = t.engine.preview(&req).unwrap();
    assert_eq!(again.number(), "INV-001");
    assert_eq!(again, issued);

    let err = t.engine.compose_new(&req).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Compose(ComposeError::AlreadyNumbered(ref n)) if n == "INV-001"
    ));
}

#[test]
fn sequences_are_independent_per_type() {
    let t = TestEngine::new();
    let customer = t.acme();
    let mut numbers = Vec::new();
    for document_type in [
        DocumentType::PurchaseOrder,
        DocumentType::Invoice,
        DocumentType::PurchaseOrder,
        DocumentType::Quote,
    ] {
        let req = ComposeRequest::new(document_type, t.body_of(document_type), customer);
        numbers.push(t.engine.compose_new(&req).unwrap().number().to_string());
    }
    assert_eq!(numbers, vec!["PO-001", "INV-001", "PO-002", "QUO-001"]);
}

#[test]
fn customer_values_are_data_not_markup() {
    let t = TestEngine::new();
    let customer = t.add_customer(docket::Customer::new("<b>Evil</b> & Co {{customer.name}}"));
    let req = ComposeRequest::new(DocumentType::Invoice, t.invoice(), customer).with_cover(COVER);

    let doc = t.engine.preview(&req).unwrap();
    let cover = doc.section(SectionKind::CoverPage).unwrap().as_str();
    assert!(cover.contains(
        "<strong>&lt;b&gt;Evil&lt;/b&gt; &amp; Co {{customer.name}}</strong>"
    ));
}

#[test]
fn composition_is_deterministic() {
    let t = TestEngine::new();
    let req = full_request(t.invoice(), t.acme());
    let a = t.engine.preview(&req).unwrap();
    let b = t.engine.preview(&req).unwrap();
    assert_eq!(a.to_html(), b.to_html());
    assert_eq!(a.digest(), b.digest());
}
