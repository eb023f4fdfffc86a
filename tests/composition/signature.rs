//! Signature hand-off

use crate::common::*;
use docket::{ComposeRequest, Customer, DocumentType, EngineError, SignaturePacket};

#[test]
fn packet_carries_number_signer_and_digest() {
    let t = TestEngine::new();
    let req = ComposeRequest::new(DocumentType::Invoice, t.invoice(), t.acme())
        .with_cover(COVER)
        .with_legal(TERMS);

    let packet = t.engine.prepare_signature(&req).unwrap();
    assert_eq!(packet.number, "INV-001");
    assert_eq!(packet.document_type, DocumentType::Invoice);
    assert_eq!(packet.signer_name, "Jane Doe");
    assert_eq!(packet.signer_email, "jane@acme.example");
    assert_eq!(packet.digest.len(), 64);
    assert!(packet.digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    assert!(packet.verify());
}

#[test]
fn packet_serializes_for_provider() {
    let t = TestEngine::new();
    let req = ComposeRequest::new(DocumentType::Invoice, t.invoice(), t.acme());
    let packet = t.engine.prepare_signature(&req).unwrap();

    let json = serde_json::to_value(&packet).unwrap();
    assert_eq!(json["number"], "INV-001");
    assert_eq!(json["document_type"], "invoice");

    let back: SignaturePacket = serde_json::from_value(json).unwrap();
    assert_eq!(back, packet);
}

#[test]
fn drafts_and_unreachable_signers_are_refused() {
    let t = TestEngine::new();

    let draft = t
        .engine
        .preview(&ComposeRequest::new(DocumentType::Invoice, t.invoice(), t.acme()))
        .unwrap();
    let customer = Customer::new("Jane").with_email("jane@acme.example");
    assert!(matches!(
        SignaturePacket::prepare(&draft, &customer),
        Err(EngineError::NotSignable(_))
    ));

    let no_email = t.add_customer(Customer::new("Offline"));
    let req = ComposeRequest::new(DocumentType::Invoice, t.invoice(), no_email);
    assert!(matches!(
        t.engine.prepare_signature(&req),
        Err(EngineError::NotSignable(_))
    ));
    // Refused before allocation: the next real document is still first
    let req = ComposeRequest::new(DocumentType::Invoice, t.invoice(), t.acme());
    assert_eq!(t.engine.compose_new(&req).unwrap().number(), "INV-001");
}
