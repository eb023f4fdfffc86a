//! Concurrent composition
//!
//! Many threads call `compose_new` on one shared engine. Every composed
//! document must carry a distinct number, each thread must see its numbers
//! increase, and the counter must end exactly at the number of documents.

use crate::common::*;
use docket::{ComposeRequest, CounterStore, DocketConfig, DocumentType, NumberFormat, SectionKind};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 8;
const PER_THREAD: usize = 25;

fn contended_engine() -> TestEngine {
    let mut config = DocketConfig::default();
    // Worst case one retry per competing thread per allocation
    config.retry.max_retries = 500;
    config.retry.base_delay_ms = 0;
    config.retry.max_delay_ms = 1;
    TestEngine::with_config(config)
}

fn compose_concurrently(t: &TestEngine, document_type: DocumentType) -> Vec<Vec<String>> {
    let customer = t.acme();
    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let engine = Arc::clone(&t.engine);
            let barrier = Arc::clone(&barrier);
            let req = ComposeRequest::new(document_type, t.body_of(document_type), customer).with_cover(COVER);
            thread::spawn(move || {
                barrier.wait();
                (0..PER_THREAD)
                    .map(|_| {
                        let doc = engine.compose_new(&req).unwrap();
                        // The number rendered into the cover is the one returned
                        let cover = doc.section(SectionKind::CoverPage).unwrap().as_str();
                        assert!(cover.contains(doc.number()));
                        doc.number().to_string()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

#[test]
fn concurrent_compositions_get_unique_numbers() {
    let t = contended_engine();
    let per_thread = compose_concurrently(&t, DocumentType::PurchaseOrder);

    let all: Vec<String> = per_thread.into_iter().flatten().collect();
    let unique: HashSet<&String> = all.iter().collect();
    assert_eq!(all.len(), THREADS * PER_THREAD);
    assert_eq!(unique.len(), all.len(), "duplicate numbers issued");

    // Gapless: exactly PO-001 ..= PO-200
    let format = NumberFormat::default();
    let mut sequences: Vec<u64> = all
        .iter()
        .map(|n| format.parse(DocumentType::PurchaseOrder, n).unwrap())
        .collect();
    sequences.sort_unstable();
    assert_eq!(sequences, (1..=(THREADS * PER_THREAD) as u64).collect::<Vec<_>>());

    let counter = t.counters.fetch_counter(DocumentType::PurchaseOrder).unwrap();
    assert_eq!(counter.last_issued, (THREADS * PER_THREAD) as u64);
}

#[test]
fn each_thread_sees_increasing_numbers() {
    let t = contended_engine();
    let format = NumberFormat::default();
    for numbers in compose_concurrently(&t, DocumentType::Invoice) {
        let sequences: Vec<u64> = numbers
            .iter()
            .map(|n| format.parse(DocumentType::Invoice, n).unwrap())
            .collect();
        assert!(sequences.windows(2).all(|w| w[0] < w[1]), "{:?}", sequences);
    }
}

#[test]
fn concurrent_types_do_not_interfere() {
    let t = contended_engine();
    let customer = t.acme();
    let issued = Arc::new(Mutex::new(Vec::new()));
    let types = [DocumentType::Invoice, DocumentType::Quote, DocumentType::PurchaseOrder];
    let barrier = Arc::new(Barrier::new(types.len() * 2));

    let handles: Vec<_> = types
        .iter()
        .chain(types.iter())
        .map(|&document_type| {
            let engine = Arc::clone(&t.engine);
            let barrier = Arc::clone(&barrier);
            let issued = Arc::clone(&issued);
            let req = ComposeRequest::new(document_type, t.body_of(document_type), customer);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..20 {
                    let doc = engine.compose_new(&req).unwrap();
                    issued.lock().push((document_type, doc.number().to_string()));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let issued = issued.lock();
    for document_type in types {
        let numbers: HashSet<&String> = issued
            .iter()
            .filter(|(ty, _)| *ty == document_type)
            .map(|(_, n)| n)
            .collect();
        assert_eq!(numbers.len(), 40);
        assert_eq!(
            t.counters.fetch_counter(document_type).unwrap().last_issued,
            40
        );
    }
}
