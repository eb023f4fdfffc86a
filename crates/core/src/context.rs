//! Variable context placeholders resolve against
//!
//! Keys are namespaced by source (`customer.*`, `document.*`, `totals.*`).
//! A key that is absent and a key bound to an empty string are different
//! things: the renderer fails on the former and prints the latter.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value bound to a context key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ContextValue {
    /// Free text
    Text(String),
    /// Exact decimal, printed at its stored scale
    Number(Decimal),
    /// Calendar date, printed with the configured date format
    Date(NaiveDate),
}

impl ContextValue {
    /// Borrow the text of a `Text` value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContextValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for ContextValue {
    fn from(s: &str) -> Self {
        ContextValue::Text(s.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(s: String) -> Self {
        ContextValue::Text(s)
    }
}

impl From<Decimal> for ContextValue {
    fn from(d: Decimal) -> Self {
        ContextValue::Number(d)
    }
}

impl From<NaiveDate> for ContextValue {
    fn from(d: NaiveDate) -> Self {
        ContextValue::Date(d)
    }
}

/// Mapping from placeholder key to value
///
/// Ordered so iteration (and anything derived from it) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableContext {
    values: BTreeMap<String, ContextValue>,
}

impl VariableContext {
    /// Empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a key, replacing any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Bind a key only when the upstream field is present
    ///
    /// `None` leaves the key absent; it is never turned into an empty string.
    pub fn insert_opt<V: Into<ContextValue>>(&mut self, key: impl Into<String>, value: Option<V>) {
        if let Some(v) = value {
            self.insert(key, v);
        }
    }

    /// Look up a key
    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.values.get(key)
    }

    /// Whether a key is bound
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of bound keys
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no key is bound
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate bindings in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContextValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copy of this context with `document.number` bound
    pub fn with_number(&self, number: impl Into<String>) -> Self {
        let mut ctx = self.clone();
        ctx.insert("document.number", number.into());
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_and_empty_are_distinct() {
        let mut ctx = VariableContext::new();
        ctx.insert("totals.discount", "");
        ctx.insert_opt::<String>("customer.phone", None);

        assert_eq!(ctx.get("totals.discount").and_then(|v| v.as_text()), Some(""));
        assert!(!ctx.contains("customer.phone"));
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn test_with_number_leaves_original_untouched() {
        let mut ctx = VariableContext::new();
        ctx.insert("customer.name", "Acme");
        let numbered = ctx.with_number("PO-001");

        assert!(!ctx.contains("document.number"));
        assert_eq!(
            numbered.get("document.number"),
            Some(&ContextValue::Text("PO-001".into()))
        );
    }

    #[test]
    fn test_iteration_is_key_ordered() {
        let mut ctx = VariableContext::new();
        ctx.insert("totals.total", "1");
        ctx.insert("customer.name", "A");
        ctx.insert("document.title", "T");
        let keys: Vec<_> = ctx.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["customer.name", "document.title", "totals.total"]);
    }
}
