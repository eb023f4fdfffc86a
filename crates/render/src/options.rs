//! Render options

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use docket_core::RenderLimits;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};
use thiserror::Error;

/// What to do with script-capable markup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsafeMarkupPolicy {
    /// Remove the construct and keep rendering
    #[default]
    Strip,
    /// Fail the render with `UnsafeMarkupRejected`
    Reject,
}

/// Date format string that is known to be valid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat(String);

/// strftime string chrono cannot format with
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid date format '{0}'")]
pub struct InvalidDateFormat(pub String);

impl DateFormat {
    /// Default ISO 8601 date (`2024-03-01`)
    pub const ISO: &'static str = "%Y-%m-%d";

    /// Validate a strftime format string
    ///
    /// Rejects malformed specifiers and specifiers a date alone cannot
    /// fill (`%H`, `%p`, `%Z`, `%s`).
    pub fn new(format: impl Into<String>) -> Result<Self, InvalidDateFormat> {
        let format = format.into();
        if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return Err(InvalidDateFormat(format));
        }
        match write_date(&format, NaiveDate::MIN) {
            Ok(_) => Ok(DateFormat(format)),
            Err(fmt::Error) => Err(InvalidDateFormat(format)),
        }
    }

    /// Format a date
    ///
    /// Falls back to ISO 8601 if the date cannot be written in this format.
    pub fn format(&self, date: NaiveDate) -> String {
        write_date(&self.0, date)
            .or_else(|_| write_date(Self::ISO, date))
            .unwrap_or_default()
    }

    /// The format string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn write_date(format: &str, date: NaiveDate) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write!(out, "{}", date.format(format))?;
    Ok(out)
}

impl Default for DateFormat {
    fn default() -> Self {
        DateFormat(Self::ISO.to_string())
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Options shared by every render
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// How `ContextValue::Date` is printed
    pub date_format: DateFormat,
    /// Strip or reject unsafe markup
    pub policy: UnsafeMarkupPolicy,
    /// Size and nesting limits
    pub limits: RenderLimits,
}

impl RenderOptions {
    /// Set the unsafe markup policy
    pub fn with_policy(mut self, policy: UnsafeMarkupPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the date format
    pub fn with_date_format(mut self, date_format: DateFormat) -> Self {
        self.date_format = date_format;
        self
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: RenderLimits) -> Self {
        self.limits = limits;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_date_format() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(DateFormat::default().format(d), "2024-03-01");
    }

    #[test]
    fn test_custom_date_format() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let f = DateFormat::new("%d %B %Y").unwrap();
        assert_eq!(f.format(d), "01 March 2024");
    }

    #[test]
    fn test_invalid_date_format_rejected() {
        assert!(DateFormat::new("%Q").is_err());
        assert!(DateFormat::new("%").is_err());
    }

    #[test]
    fn test_time_specifiers_rejected() {
        for format in ["%H", "%Y-%m-%d %H:%M", "%I:%M %p", "%S", "%Z", "%s"] {
            assert_eq!(
                DateFormat::new(format),
                Err(InvalidDateFormat(format.to_string())),
                "{format}"
            );
        }
    }

    #[test]
    fn test_valid_format_never_panics_across_dates() {
        let f = DateFormat::new("%A %e %b %Y (%j)").unwrap();
        for date in [NaiveDate::MIN, NaiveDate::MAX, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()] {
            assert!(!f.format(date).is_empty());
        }
    }
}
