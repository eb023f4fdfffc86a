//! Escaping for text and attribute values
//!
//! Substituted values are data, never markup. They are escaped for the
//! template's markup language before insertion, and text nodes are escaped
//! again on serialization.

/// Escape text for HTML text or a double-quoted attribute
pub fn html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Characters the markdown parser treats as syntax
const MARKDOWN_SPECIAL: &[char] = &[
    '\\', '`', '*', '_', '[', ']', '(', ')', '#', '+', '-', '.', '!', '|', '>', '<', '&',
];

/// Escape text for insertion into markdown
///
/// Every syntax character is backslash-escaped. Line breaks become spaces
/// because a newline is block structure in markdown and cannot be escaped.
pub fn markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\r' | '\n' => out.push(' '),
            c if MARKDOWN_SPECIAL.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Whether a character may follow a backslash as an escape in markdown
pub fn is_markdown_escapable(c: char) -> bool {
    c.is_ascii_punctuation()
}

/// Decode HTML character references in text or an attribute value
///
/// Supports the five XML entities, `&nbsp;`, and decimal / hex numeric
/// references. Anything else is left as written.
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        match after.find(';').filter(|&end| end <= 10) {
            Some(end) => match decode_reference(&after[..end]) {
                Some(c) => {
                    out.push(c);
                    rest = &after[end + 1..];
                }
                None => {
                    out.push('&');
                    rest = after;
                }
            },
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok()?
            } else {
                return None;
            };
            // NUL and invalid scalar values decode to the replacement character
            match char::from_u32(code) {
                Some('\0') | None => Some('\u{fffd}'),
                Some(c) => Some(c),
            }
        }
    }
}
