//! Issued-number registry and reconciliation
//!
//! The allocator is only as exact as the store's compare-and-swap. A store
//! that cannot guarantee atomicity may let two writers commit the same
//! counter value; the registry catches that and turns it into an error
//! rather than handing the same number to two documents.

use crate::format::NumberFormat;
use dashmap::DashMap;
use docket_core::{AllocationError, AllocationResult, DocumentType, SequenceCounter};
use std::collections::{BTreeMap, BTreeSet};

/// Most out-of-order claims held above the high-water mark per type.
///
/// With an atomic store every committed value is claimed, so the window only
/// holds claims that raced ahead of a slower writer. Past this size the
/// lowest hole is given up on and folded into the mark.
pub const CLAIM_WINDOW: usize = 1024;

/// Claims for one type: everything `<= high_water` plus `ahead`
#[derive(Debug, Default)]
struct Claims {
    high_water: u64,
    ahead: BTreeSet<u64>,
}

impl Claims {
    fn contains(&self, sequence: u64) -> bool {
        sequence <= self.high_water || self.ahead.contains(&sequence)
    }

    fn insert(&mut self, sequence: u64) -> bool {
        if self.contains(sequence) {
            return false;
        }
        self.ahead.insert(sequence);
        self.compact();
        true
    }

    fn raise(&mut self, high_water: u64) {
        self.high_water = self.high_water.max(high_water);
        self.compact();
    }

    fn compact(&mut self) {
        let floor = self.high_water;
        self.ahead.retain(|&s| s > floor);
        while self.ahead.len() > CLAIM_WINDOW {
            if let Some(lowest) = self.ahead.pop_first() {
                self.high_water = lowest;
            }
        }
        while let Some(next) = self.high_water.checked_add(1) {
            if !self.ahead.remove(&next) {
                break;
            }
            self.high_water = next;
        }
    }
}

/// Sequence values handed out by this process, per type
///
/// Memory per type is bounded by [`CLAIM_WINDOW`] no matter how many
/// numbers are issued.
#[derive(Debug, Default)]
pub struct IssuedRegistry {
    issued: DashMap<DocumentType, Claims>,
}

impl IssuedRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sequence value as issued
    ///
    /// # Errors
    ///
    /// Returns `AllocationError::Duplicate` if the value was already issued.
    pub fn claim(&self, document_type: DocumentType, sequence: u64, number: &str) -> AllocationResult<()> {
        let mut claims = self.issued.entry(document_type).or_default();
        if !claims.insert(sequence) {
            return Err(AllocationError::Duplicate {
                number: number.to_string(),
            });
        }
        Ok(())
    }

    /// Record values that already exist in persisted documents
    ///
    /// The counter never goes back, so every value up to the highest
    /// persisted one is treated as issued, gaps included.
    pub fn record_existing(&self, document_type: DocumentType, sequences: impl IntoIterator<Item = u64>) {
        if let Some(highest) = sequences.into_iter().max() {
            self.issued.entry(document_type).or_default().raise(highest);
        }
    }

    /// Whether a value has been issued
    pub fn contains(&self, document_type: DocumentType, sequence: u64) -> bool {
        self.issued
            .get(&document_type)
            .map(|claims| claims.contains(sequence))
            .unwrap_or(false)
    }

    /// Highest value below which every value counts as issued
    pub fn high_water(&self, document_type: DocumentType) -> u64 {
        self.issued
            .get(&document_type)
            .map(|claims| claims.high_water)
            .unwrap_or(0)
    }

    /// Claims held above the high-water mark
    pub fn pending(&self, document_type: DocumentType) -> usize {
        self.issued
            .get(&document_type)
            .map(|claims| claims.ahead.len())
            .unwrap_or(0)
    }
}

/// Result of checking persisted numbers against a counter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationReport {
    /// Type reconciled
    pub document_type: DocumentType,
    /// Counter value at reconciliation time
    pub last_issued: u64,
    /// Highest valid sequence among existing numbers
    pub highest: Option<u64>,
    /// Valid sequence values found, ascending
    pub sequences: Vec<u64>,
    /// Numbers that appear more than once
    pub duplicates: Vec<String>,
    /// Numbers that do not parse, with the reason
    pub invalid: Vec<AllocationError>,
    /// Values in 1..=highest that no document carries
    pub gap_count: u64,
}

impl ReconciliationReport {
    /// True when the counter can safely keep issuing
    pub fn is_clean(&self) -> bool {
        self.duplicates.is_empty() && self.invalid.is_empty() && !self.is_stale()
    }

    /// True when existing numbers are ahead of the counter
    pub fn is_stale(&self) -> bool {
        self.highest.is_some_and(|h| h > self.last_issued)
    }

    /// First problem found, as an error
    ///
    /// Duplicates take precedence over staleness, which takes precedence
    /// over unparseable numbers. Gaps are reported but are not an error:
    /// they happen whenever a composed document is abandoned.
    pub fn into_result(self) -> AllocationResult<()> {
        if let Some(number) = self.duplicates.into_iter().next() {
            return Err(AllocationError::Duplicate { number });
        }
        if let Some(highest) = self.highest.filter(|&h| h > self.last_issued) {
            return Err(AllocationError::Stale {
                document_type: self.document_type,
                last_issued: self.last_issued,
                highest,
            });
        }
        if let Some(err) = self.invalid.into_iter().next() {
            return Err(err);
        }
        Ok(())
    }
}

/// Check numbers already persisted for a type against its counter
pub fn reconcile<'a>(
    format: &NumberFormat,
    counter: &SequenceCounter,
    existing: impl IntoIterator<Item = &'a str>,
) -> ReconciliationReport {
    let document_type = counter.document_type;
    let mut seen: BTreeMap<u64, usize> = BTreeMap::new();
    let mut duplicates = Vec::new();
    let mut invalid = Vec::new();

    for text in existing {
        match format.parse(document_type, text) {
            Ok(seq) => {
                let count = seen.entry(seq).or_insert(0);
                *count += 1;
                if *count == 2 {
                    duplicates.push(text.to_string());
                }
            }
            Err(e) => invalid.push(e),
        }
    }

    let highest = seen.keys().next_back().copied();
    let sequences: Vec<u64> = seen.into_keys().collect();
    let gap_count = highest.map_or(0, |h| h - sequences.len() as u64);

    ReconciliationReport {
        document_type,
        last_issued: counter.last_issued,
        highest,
        sequences,
        duplicates,
        invalid,
        gap_count,
    }
}
