//! Reconciliation against persisted numbers

use crate::common::*;
use docket::{AllocationError, ComposeRequest, DocumentType};

fn issue_and_persist(t: &TestEngine, count: usize) -> Vec<String> {
    let customer = t.acme();
    (0..count)
        .map(|_| {
            let body = t.invoice();
            let doc = t
                .engine
                .compose_new(&ComposeRequest::new(DocumentType::Invoice, body, customer))
                .unwrap();
            t.records.assign_number(&body, doc.number()).unwrap();
            doc.number().to_string()
        })
        .collect()
}

#[test]
fn persisted_numbers_match_counter() {
    let t = TestEngine::new();
    let issued = issue_and_persist(&t, 3);
    assert_eq!(issued, vec!["INV-001", "INV-002", "INV-003"]);

    let persisted = t.records.numbers(DocumentType::Invoice);
    let report = t
        .engine
        .reconcile(DocumentType::Invoice, persisted.iter().map(String::as_str))
        .unwrap();
    assert!(report.is_clean());
    assert_eq!(report.last_issued, 3);
    assert_eq!(report.gap_count, 0);
}

#[test]
fn abandoned_document_leaves_reported_gap() {
    let t = TestEngine::new();
    issue_and_persist(&t, 1);
    // Composed but never persisted
    t.engine
        .compose_new(&ComposeRequest::new(DocumentType::Invoice, t.invoice(), t.acme()))
        .unwrap();
    issue_and_persist(&t, 1);

    let persisted = t.records.numbers(DocumentType::Invoice);
    assert_eq!(persisted, vec!["INV-001", "INV-003"]);
    let report = t
        .engine
        .reconcile(DocumentType::Invoice, persisted.iter().map(String::as_str))
        .unwrap();
    assert_eq!(report.gap_count, 1);
    assert!(report.is_clean());
}

#[test]
fn imported_numbers_ahead_of_counter_are_stale() {
    let t = TestEngine::new();
    issue_and_persist(&t, 2);
    // Imported from a previous system without touching the counter
    t.add_body(invoice_body().with_number("INV-040"));

    let persisted = t.records.numbers(DocumentType::Invoice);
    let report = t
        .engine
        .reconcile(DocumentType::Invoice, persisted.iter().map(String::as_str))
        .unwrap();
    assert!(report.is_stale());
    assert_eq!(report.highest, Some(40));
    assert_eq!(
        report.into_result(),
        Err(AllocationError::Stale {
            document_type: DocumentType::Invoice,
            last_issued: 2,
            highest: 40,
        })
    );
}

#[test]
fn duplicate_and_malformed_numbers_reported() {
    let t = TestEngine::new();
    issue_and_persist(&t, 2);

    let report = t
        .engine
        .reconcile(DocumentType::Invoice, ["INV-001", "INV-002", "INV-002", "INV-2", "PO-001"])
        .unwrap();
    assert_eq!(report.duplicates, vec!["INV-002".to_string()]);
    assert_eq!(report.invalid.len(), 2);
    assert!(!report.is_clean());
    assert!(matches!(
        report.into_result(),
        Err(AllocationError::Duplicate { ref number }) if number == "INV-002"
    ));
}
