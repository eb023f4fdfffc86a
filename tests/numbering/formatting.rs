//! Number formatting through the engine

use crate::common::*;
use docket::{
    allocate_next, parse_number, ComposeRequest, CounterStore, DocketConfig, DocumentType,
    NumberFormat, SequenceCounter,
};
use proptest::prelude::*;

#[test]
fn first_numbers_per_type() {
    let counter = |t| SequenceCounter::new(t);
    assert_eq!(
        allocate_next(DocumentType::PurchaseOrder, &counter(DocumentType::PurchaseOrder))
            .unwrap()
            .0,
        "PO-001"
    );
    assert_eq!(
        allocate_next(DocumentType::OrderForm, &counter(DocumentType::OrderForm))
            .unwrap()
            .0,
        "OF-001"
    );
}

#[test]
fn numbers_grow_past_minimum_width() {
    let t = TestEngine::new();
    let po = DocumentType::PurchaseOrder;
    t.counters
        .commit_counter(&SequenceCounter::new(po), SequenceCounter::at(po, 998))
        .unwrap();

    let customer = t.acme();
    let body = t.body_of(po);
    let req = ComposeRequest::new(po, body, customer).with_cover(COVER);
    let numbers: Vec<String> = (0..3)
        .map(|_| t.engine.compose_new(&req).unwrap().number().to_string())
        .collect();
    assert_eq!(numbers, vec!["PO-999", "PO-1000", "PO-1001"]);
}

#[test]
fn configured_prefix_and_width() {
    let config = DocketConfig::from_toml_str(
        "[numbering]\nmin_width = 5\n[numbering.prefixes]\ninvoice = \"BILL\"\n",
    )
    .unwrap();
    let t = TestEngine::with_config(config);
    let req = ComposeRequest::new(DocumentType::Invoice, t.invoice(), t.acme()).with_cover(COVER);

    let doc = t.engine.compose_new(&req).unwrap();
    assert_eq!(doc.number(), "BILL-00001");
    assert!(doc.to_html().starts_with("<h1>Invoice BILL-00001</h1>"));
}

proptest! {
    #[test]
    fn prop_parse_inverts_format(seq in 1u64..u64::MAX, width in 1usize..=8) {
        let format = NumberFormat::with_min_width(width).unwrap();
        for document_type in DocumentType::ALL {
            let number = format.format(document_type, seq);
            prop_assert_eq!(format.parse(document_type, &number).unwrap(), seq);
        }
    }

    #[test]
    fn prop_default_format_roundtrip(seq in 1u64..1_000_000) {
        let number = NumberFormat::default().format(DocumentType::Quote, seq);
        prop_assert_eq!(parse_number(DocumentType::Quote, &number).unwrap(), seq);
    }
}
