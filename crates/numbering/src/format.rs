//! Number formatting and the pure allocator
//!
//! A document number is `<prefix>-<sequence>` where the sequence is
//! zero-padded to a minimum width and grows past it as needed:
//!
//! ```text
//! last_issued = 0    → PO-001
//! last_issued = 41   → PO-042
//! last_issued = 999  → PO-1000
//! ```
//!
//! Formatting is canonical: every sequence value has exactly one textual
//! form, so `parse(format(n)) == n` and two distinct values never print the
//! same.

use docket_core::{AllocationError, AllocationResult, DocumentType, SequenceCounter};
use std::collections::BTreeMap;
use thiserror::Error;

/// Minimum zero-padded width of the sequence part
pub const DEFAULT_MIN_WIDTH: usize = 3;

/// Largest accepted minimum width (u64::MAX has 20 digits)
pub const MAX_MIN_WIDTH: usize = 20;

/// Longest accepted prefix
pub const MAX_PREFIX_LEN: usize = 10;

/// Invalid numbering configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberFormatError {
    /// Prefix is empty, too long, or not ASCII alphanumeric
    #[error("invalid prefix '{prefix}' for {document_type}: {reason}")]
    InvalidPrefix {
        /// Type the prefix was set for
        document_type: DocumentType,
        /// Rejected prefix
        prefix: String,
        /// Why it was rejected
        reason: String,
    },

    /// Two types share a prefix
    #[error("prefix '{prefix}' is used by both {first} and {second}")]
    DuplicatePrefix {
        /// Shared prefix
        prefix: String,
        /// First type
        first: DocumentType,
        /// Second type
        second: DocumentType,
    },

    /// Width outside 1..=MAX_MIN_WIDTH
    #[error("minimum width {0} is outside 1..={MAX_MIN_WIDTH}")]
    InvalidWidth(usize),
}

/// Per-type prefixes and padding width
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormat {
    prefixes: BTreeMap<DocumentType, String>,
    min_width: usize,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            prefixes: DocumentType::ALL
                .into_iter()
                .map(|t| (t, t.default_prefix().to_string()))
                .collect(),
            min_width: DEFAULT_MIN_WIDTH,
        }
    }
}

impl NumberFormat {
    /// Default prefixes with a custom minimum width
    pub fn with_min_width(min_width: usize) -> Result<Self, NumberFormatError> {
        if min_width == 0 || min_width > MAX_MIN_WIDTH {
            return Err(NumberFormatError::InvalidWidth(min_width));
        }
        Ok(Self {
            min_width,
            ..Self::default()
        })
    }

    /// Override the prefix of one type
    ///
    /// # Errors
    ///
    /// Rejects empty, over-long and non-alphanumeric prefixes, and prefixes
    /// already used by another type.
    pub fn with_prefix(
        mut self,
        document_type: DocumentType,
        prefix: impl Into<String>,
    ) -> Result<Self, NumberFormatError> {
        let prefix = prefix.into();
        let invalid = |reason: &str| NumberFormatError::InvalidPrefix {
            document_type,
            prefix: prefix.clone(),
            reason: reason.to_string(),
        };
        if prefix.is_empty() {
            return Err(invalid("empty"));
        }
        if prefix.len() > MAX_PREFIX_LEN {
            return Err(invalid("too long"));
        }
        if !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(invalid("must be ASCII letters and digits"));
        }
        if let Some((&other, _)) = self
            .prefixes
            .iter()
            .find(|(&t, p)| t != document_type && **p == prefix)
        {
            return Err(NumberFormatError::DuplicatePrefix {
                prefix,
                first: other,
                second: document_type,
            });
        }
        self.prefixes.insert(document_type, prefix);
        Ok(self)
    }

    /// Prefix for a type
    pub fn prefix(&self, document_type: DocumentType) -> &str {
        self.prefixes
            .get(&document_type)
            .map(String::as_str)
            .unwrap_or_else(|| document_type.default_prefix())
    }

    /// Minimum width of the sequence part
    pub fn min_width(&self) -> usize {
        self.min_width
    }

    /// Render a sequence value
    pub fn format(&self, document_type: DocumentType, sequence: u64) -> String {
        format!(
            "{}-{:0width$}",
            self.prefix(document_type),
            sequence,
            width = self.min_width
        )
    }

    /// Issue the number after `counter`
    ///
    /// Pure: returns the number and the counter to commit, and changes
    /// nothing. The caller must commit the returned counter atomically.
    ///
    /// # Errors
    ///
    /// - `Corrupt` if the counter belongs to a different type
    /// - `Exhausted` if the counter is at `u64::MAX`
    pub fn allocate_next(
        &self,
        document_type: DocumentType,
        counter: &SequenceCounter,
    ) -> AllocationResult<(String, SequenceCounter)> {
        if counter.document_type != document_type {
            return Err(AllocationError::Corrupt {
                document_type,
                reason: format!("counter belongs to {}", counter.document_type),
            });
        }
        let next = counter
            .last_issued
            .checked_add(1)
            .ok_or(AllocationError::Exhausted(document_type))?;
        Ok((
            self.format(document_type, next),
            SequenceCounter::at(document_type, next),
        ))
    }

    /// Recover the sequence value from an issued number
    ///
    /// Only the canonical form is accepted: `PO-001` parses, `PO-01`,
    /// `PO-0042` and `INV-001` (as a purchase order) do not.
    pub fn parse(&self, document_type: DocumentType, text: &str) -> AllocationResult<u64> {
        let invalid = |reason: &str| AllocationError::InvalidNumber {
            number: text.to_string(),
            reason: reason.to_string(),
        };

        let digits = text
            .strip_prefix(self.prefix(document_type))
            .and_then(|rest| rest.strip_prefix('-'))
            .ok_or_else(|| {
                invalid(&format!(
                    "expected prefix '{}-'",
                    self.prefix(document_type)
                ))
            })?;

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("sequence must be decimal digits"));
        }
        if digits.len() < self.min_width {
            return Err(invalid("sequence is shorter than the minimum width"));
        }
        if digits.len() > self.min_width && digits.starts_with('0') {
            return Err(invalid("sequence has excess leading zeros"));
        }

        let value: u64 = digits
            .parse()
            .map_err(|_| invalid("sequence does not fit in 64 bits"))?;
        if value == 0 {
            return Err(invalid("sequence starts at 1"));
        }
        Ok(value)
    }
}

/// Issue the next number with the default format
///
/// `allocate_next(PurchaseOrder, {last_issued: 0})` → `"PO-001"`.
pub fn allocate_next(
    document_type: DocumentType,
    counter: &SequenceCounter,
) -> AllocationResult<(String, SequenceCounter)> {
    NumberFormat::default().allocate_next(document_type, counter)
}

/// Parse a number issued with the default format
pub fn parse_number(document_type: DocumentType, text: &str) -> AllocationResult<u64> {
    NumberFormat::default().parse(document_type, text)
}
