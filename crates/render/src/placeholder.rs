//! Placeholder scanning
//!
//! Syntax: `{{` key `}}`, with optional whitespace inside the delimiters.
//! A key is one or more segments of `[A-Za-z0-9_-]` joined by `.`:
//!
//! ```text
//! {{customer.name}}            ok
//! {{ customer.address.city }}  ok
//! {{customer.name              unterminated → MalformedPlaceholder
//! {{customer..name}}           empty segment → MalformedPlaceholder
//! ```
//!
//! A lone `}}` outside a placeholder is literal text.

use docket_core::{RenderError, RenderResult};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Piece of scanned template content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text copied through unchanged
    Literal(&'a str),
    /// A well-formed placeholder
    Placeholder {
        /// Trimmed key (`customer.name`)
        key: &'a str,
        /// Byte offset of the opening `{{`
        offset: usize,
    },
}

/// Split template content into literals and placeholders
///
/// # Errors
///
/// Returns `RenderError::MalformedPlaceholder` for an unterminated `{{` or
/// an invalid key.
pub fn scan(content: &str) -> RenderResult<Vec<Segment<'_>>> {
    let mut segments = Vec::new();
    let mut pos = 0;

    while let Some(rel) = content[pos..].find(OPEN) {
        let start = pos + rel;
        if start > pos {
            segments.push(Segment::Literal(&content[pos..start]));
        }

        let inner_start = start + OPEN.len();
        let inner_len = content[inner_start..]
            .find(CLOSE)
            .ok_or_else(|| malformed(start, "unterminated placeholder"))?;
        let key = content[inner_start..inner_start + inner_len].trim();
        validate_key(key).map_err(|reason| malformed(start, &reason))?;

        segments.push(Segment::Placeholder { key, offset: start });
        pos = inner_start + inner_len + CLOSE.len();
    }

    if pos < content.len() {
        segments.push(Segment::Literal(&content[pos..]));
    }
    Ok(segments)
}

/// Keys referenced by a template, in first-use order, without duplicates
pub fn referenced_keys(content: &str) -> RenderResult<Vec<&str>> {
    let mut keys: Vec<&str> = Vec::new();
    for seg in scan(content)? {
        if let Segment::Placeholder { key, .. } = seg {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }
    Ok(keys)
}

fn validate_key(key: &str) -> Result<(), String> {
    if key.is_empty() {
        return Err("empty placeholder".to_string());
    }
    for segment in key.split('.') {
        if segment.is_empty() {
            return Err(format!("empty segment in key '{}'", key));
        }
        if let Some(c) = segment
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
        {
            return Err(format!("unexpected character '{}' in key '{}'", c, key));
        }
    }
    Ok(())
}

fn malformed(offset: usize, reason: &str) -> RenderError {
    RenderError::MalformedPlaceholder {
        offset,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_mixed_content() {
        let segs = scan("Dear {{customer.name}}, re {{ document.number }}.").unwrap();
        assert_eq!(
            segs,
            vec![
                Segment::Literal("Dear "),
                Segment::Placeholder {
                    key: "customer.name",
                    offset: 5
                },
                Segment::Literal(", re "),
                Segment::Placeholder {
                    key: "document.number",
                    offset: 27
                },
                Segment::Literal("."),
            ]
        );
    }

    #[test]
    fn test_scan_without_placeholders() {
        assert_eq!(scan("plain").unwrap(), vec![Segment::Literal("plain")]);
        assert!(scan("").unwrap().is_empty());
    }

    #[test]
    fn test_adjacent_placeholders() {
        let segs = scan("{{a.b}}{{c.d}}").unwrap();
        assert_eq!(segs.len(), 2);
    }

    #[test]
    fn test_unterminated_placeholder() {
        let err = scan("Hello {{customer.name").unwrap_err();
        assert_eq!(
            err,
            RenderError::MalformedPlaceholder {
                offset: 6,
                reason: "unterminated placeholder".into()
            }
        );
    }

    #[test]
    fn test_invalid_keys() {
        for bad in ["{{}}", "{{  }}", "{{a..b}}", "{{.a}}", "{{a b}}", "{{a {{b}}", "{{<script>}}"] {
            assert!(
                matches!(scan(bad), Err(RenderError::MalformedPlaceholder { offset: 0, .. })),
                "{} should be malformed",
                bad
            );
        }
    }

    #[test]
    fn test_stray_close_is_literal() {
        assert_eq!(scan("a }} b").unwrap(), vec![Segment::Literal("a }} b")]);
    }

    #[test]
    fn test_single_brace_is_literal() {
        assert_eq!(scan("{a.b}").unwrap(), vec![Segment::Literal("{a.b}")]);
    }

    #[test]
    fn test_referenced_keys_dedup() {
        let keys = referenced_keys("{{customer.name}} {{totals.total}} {{customer.name}}").unwrap();
        assert_eq!(keys, vec!["customer.name", "totals.total"]);
    }

    #[test]
    fn test_offsets_are_bytes() {
        // 'é' is two bytes
        let segs = scan("é{{a.b}}").unwrap();
        assert_eq!(segs[1], Segment::Placeholder { key: "a.b", offset: 2 });
    }
}
