//! Markdown parsing
//!
//! Parses the subset the markup tree can represent:
//!
//! | Construct        | Syntax                                   |
//! |------------------|------------------------------------------|
//! | Heading          | `#` .. `######`                          |
//! | Rule             | `---`, `***`, `___`                      |
//! | List             | `-`, `*`, `+`, `1.`, `1)`                |
//! | Quote            | `>`                                      |
//! | Table            | pipe rows with a `---` delimiter row     |
//! | Strong, emphasis | `**x**`, `__x__`, `*x*`, `_x_`           |
//! | Link             | `[text](url)`                            |
//! | Hard break       | two trailing spaces or a trailing `\`    |
//!
//! Raw HTML has no meaning here and is kept as text, so it is escaped on
//! output. Images keep only their alt text. A backslash before ASCII
//! punctuation makes it literal, which is how substituted values stay data.

use crate::escape::is_markdown_escapable;
use crate::html::{safe_href, script_scheme};
use crate::markup::{has_content, Block, Cell, Document, Inline, List, Row, Table};
use crate::options::UnsafeMarkupPolicy;
use docket_core::{RenderError, RenderLimits, RenderResult};

/// Parse markdown into the markup tree
///
/// # Errors
///
/// - `UnsafeMarkupRejected` under `Reject` for a link to a script URL
/// - `LimitExceeded` when nesting is deeper than `limits.max_nesting_depth`
pub fn parse(input: &str, policy: UnsafeMarkupPolicy, limits: &RenderLimits) -> RenderResult<Document> {
    let lines: Vec<&str> = input.lines().collect();
    let parser = Parser { policy, limits };
    Ok(Document::new(parser.blocks(&lines, 0)?))
}

struct Parser<'l> {
    policy: UnsafeMarkupPolicy,
    limits: &'l RenderLimits,
}

impl Parser<'_> {
    fn blocks(&self, lines: &[&str], depth: usize) -> RenderResult<Vec<Block>> {
        self.limits.check_depth(depth)?;
        let mut out = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];
            if is_blank(line) {
                i += 1;
            } else if let Some((level, text)) = heading(line) {
                out.push(Block::Heading {
                    level,
                    content: self.inlines(text, depth + 1)?,
                });
                i += 1;
            } else if is_rule(line) {
                out.push(Block::Rule);
                i += 1;
            } else if quote_content(line).is_some() {
                let mut inner = Vec::new();
                while let Some(content) = lines.get(i).copied().and_then(quote_content) {
                    inner.push(content);
                    i += 1;
                }
                out.push(Block::Quote(self.blocks(&inner, depth + 1)?));
            } else if let Some(marker) = list_marker(line) {
                let (list, next) = self.list(lines, i, marker.ordered, depth)?;
                out.push(Block::List(list));
                i = next;
            } else if is_table_start(lines, i) {
                let (table, next) = self.table(lines, i, depth)?;
                out.push(Block::Table(table));
                i = next;
            } else {
                let start = i;
                i += 1;
                while i < lines.len() && !is_blank(lines[i]) && !interrupts(lines, i) {
                    i += 1;
                }
                let content = self.paragraph(&lines[start..i], depth + 1)?;
                if has_content(&content) {
                    out.push(Block::Paragraph(content));
                }
            }
        }
        Ok(out)
    }

    fn list(&self, lines: &[&str], start: usize, ordered: bool, depth: usize) -> RenderResult<(List, usize)> {
        let mut items = Vec::new();
        let mut i = start;

        while let Some(marker) = lines
            .get(i)
            .copied()
            .and_then(list_marker)
            .filter(|m| m.ordered == ordered)
        {
            let mut content = vec![lines[i].get(marker.offset..).unwrap_or("")];
            i += 1;

            while i < lines.len() {
                let line = lines[i];
                if is_blank(line) {
                    // A blank line continues the item only if indented content follows
                    match next_non_blank(lines, i) {
                        Some(n) if indent(lines[n]) >= 2 => {
                            content.extend(std::iter::repeat("").take(n - i));
                            i = n;
                        }
                        _ => break,
                    }
                } else if indent(line) >= 2 {
                    content.push(&line[indent(line).min(marker.offset)..]);
                    i += 1;
                } else if interrupts(lines, i) {
                    break;
                } else {
                    content.push(line);
                    i += 1;
                }
            }
            items.push(self.blocks(&content, depth + 1)?);

            if lines.get(i).is_some_and(|l| is_blank(l)) {
                match next_non_blank(lines, i) {
                    Some(n) if list_marker(lines[n]).is_some_and(|m| m.ordered == ordered) => i = n,
                    _ => break,
                }
            }
        }

        Ok((List { ordered, items }, i))
    }

    fn table(&self, lines: &[&str], start: usize, depth: usize) -> RenderResult<(Table, usize)> {
        let mut table = Table::default();
        table.head.push(self.row(lines[start], true, depth)?);
        let mut i = start + 2;
        while i < lines.len() && !is_blank(lines[i]) && has_pipe(lines[i]) {
            table.body.push(self.row(lines[i], false, depth)?);
            i += 1;
        }
        Ok((table, i))
    }

    fn row(&self, line: &str, header: bool, depth: usize) -> RenderResult<Row> {
        let cells = split_row(line)
            .into_iter()
            .map(|cell| {
                Ok(Cell {
                    header,
                    content: self.inlines(cell.trim(), depth + 1)?,
                })
            })
            .collect::<RenderResult<Vec<_>>>()?;
        Ok(Row::new(cells))
    }

    /// Join paragraph lines; `\n` in the joined text marks a hard break
    fn paragraph(&self, lines: &[&str], depth: usize) -> RenderResult<Vec<Inline>> {
        let mut text = String::new();
        for (k, line) in lines.iter().enumerate() {
            let line = line.trim_start();
            if k + 1 == lines.len() {
                text.push_str(line.trim_end());
                break;
            }
            let (body, hard) = split_hard_break(line);
            text.push_str(body);
            text.push(if hard { '\n' } else { ' ' });
        }
        self.inlines(&text, depth)
    }

    fn inlines(&self, text: &str, depth: usize) -> RenderResult<Vec<Inline>> {
        self.limits.check_depth(depth)?;
        let mut out = Vec::new();
        let mut buf = String::new();
        let mut i = 0;

        while let Some(c) = text[i..].chars().next() {
            let rest = &text[i..];
            match c {
                '\\' => match rest[1..].chars().next().filter(|n| is_markdown_escapable(*n)) {
                    Some(n) => {
                        buf.push(n);
                        i += 1 + n.len_utf8();
                    }
                    None => {
                        buf.push('\\');
                        i += 1;
                    }
                },
                '\n' => {
                    flush_text(&mut out, &mut buf);
                    out.push(Inline::Break);
                    i += 1;
                }
                '*' | '_' => {
                    let intraword = c == '_'
                        && text[..i]
                            .chars()
                            .next_back()
                            .is_some_and(|p| p.is_alphanumeric());
                    let width = if rest[1..].starts_with(c) { 2 } else { 1 };
                    let delim = &rest[..width];
                    let closer = find_closer(&rest[width..], delim).filter(|&end| end > 0);
                    match closer {
                        Some(end) if !intraword => {
                            flush_text(&mut out, &mut buf);
                            let content = self.inlines(&rest[width..width + end], depth + 1)?;
                            out.push(if width == 2 {
                                Inline::Strong(content)
                            } else {
                                Inline::Emphasis(content)
                            });
                            i += 2 * width + end;
                        }
                        _ => {
                            buf.push_str(delim);
                            i += width;
                        }
                    }
                }
                '!' if rest[1..].starts_with('[') => match link_parts(&rest[1..]) {
                    Some((alt, _, len)) => {
                        flush_text(&mut out, &mut buf);
                        out.extend(self.inlines(alt, depth + 1)?);
                        i += 1 + len;
                    }
                    None => {
                        buf.push('!');
                        i += 1;
                    }
                },
                '[' => match link_parts(rest) {
                    Some((label, url, len)) => {
                        flush_text(&mut out, &mut buf);
                        let content = self.inlines(label, depth + 1)?;
                        out.push(Inline::Link {
                            href: self.href(url)?,
                            content,
                        });
                        i += len;
                    }
                    None => {
                        buf.push('[');
                        i += 1;
                    }
                },
                _ => {
                    buf.push(c);
                    i += c.len_utf8();
                }
            }
        }

        flush_text(&mut out, &mut buf);
        Ok(out)
    }

    fn href(&self, url: &str) -> RenderResult<Option<String>> {
        let url = unescape(url);
        if let Some(scheme) = script_scheme(&url) {
            if self.policy == UnsafeMarkupPolicy::Reject {
                return Err(RenderError::UnsafeMarkupRejected(format!(
                    "{}: URL in link target",
                    scheme
                )));
            }
            return Ok(None);
        }
        Ok(safe_href(&url))
    }
}

fn flush_text(out: &mut Vec<Inline>, buf: &mut String) {
    if !buf.is_empty() {
        out.push(Inline::Text(std::mem::take(buf)));
    }
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&n) = chars.peek().filter(|n| is_markdown_escapable(**n)) {
                out.push(n);
                chars.next();
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Byte index of the first unescaped `target`
fn find_unescaped(s: &str, target: u8) -> Option<usize> {
    let b = s.as_bytes();
    let mut j = 0;
    while j < b.len() {
        if b[j] == b'\\' {
            j += 2;
            continue;
        }
        if b[j] == target {
            return Some(j);
        }
        j += 1;
    }
    None
}

/// Byte index of the delimiter run closing `delim`; runs of other widths are skipped
fn find_closer(s: &str, delim: &str) -> Option<usize> {
    let b = s.as_bytes();
    let d = delim.as_bytes()[0];
    let mut j = 0;
    while j < b.len() {
        if b[j] == b'\\' {
            j += 2;
            continue;
        }
        if b[j] == d {
            let run = b[j..].iter().take_while(|&&x| x == d).count();
            if run == delim.len() || (delim.len() == 2 && run > 2) {
                return Some(j);
            }
            j += run;
            continue;
        }
        j += 1;
    }
    None
}

/// `[label](url)` at the start of `s`: (label, url, bytes consumed)
fn link_parts(s: &str) -> Option<(&str, &str, usize)> {
    let close = 1 + find_unescaped(&s[1..], b']')?;
    let after = &s[close + 1..];
    if !after.starts_with('(') {
        return None;
    }
    let url_len = find_unescaped(&after[1..], b')')?;
    let url = after[1..1 + url_len].trim();
    Some((&s[1..close], url, close + 1 + 1 + url_len + 1))
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn indent(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn next_non_blank(lines: &[&str], from: usize) -> Option<usize> {
    lines[from..].iter().position(|l| !is_blank(l)).map(|k| from + k)
}

fn heading(line: &str) -> Option<(u8, &str)> {
    if indent(line) > 3 {
        return None;
    }
    let t = line.trim_start();
    let hashes = t.len() - t.trim_start_matches('#').len();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &t[hashes..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }
    let content = rest.trim();
    // Optional closing sequence: `## Title ##`
    let stripped = content.trim_end_matches('#');
    let content = if stripped.is_empty() {
        ""
    } else if stripped.ends_with(' ') {
        stripped.trim_end()
    } else {
        content
    };
    Some((hashes as u8, content))
}

fn is_rule(line: &str) -> bool {
    if indent(line) > 3 {
        return false;
    }
    let mut chars = line.chars().filter(|c| !c.is_whitespace());
    let Some(first) = chars.next() else {
        return false;
    };
    let mut count = 1;
    for c in chars {
        if c != first {
            return false;
        }
        count += 1;
    }
    matches!(first, '-' | '*' | '_') && count >= 3
}

fn quote_content(line: &str) -> Option<&str> {
    if indent(line) > 3 {
        return None;
    }
    let rest = line.trim_start().strip_prefix('>')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

#[derive(Debug, Clone, Copy)]
struct Marker {
    ordered: bool,
    /// Byte offset where item content starts
    offset: usize,
}

fn list_marker(line: &str) -> Option<Marker> {
    let ind = indent(line);
    if ind > 3 {
        return None;
    }
    let b = line[ind..].as_bytes();
    let ordered = b.first()?.is_ascii_digit();
    let len = if ordered {
        let digits = b.iter().take_while(|c| c.is_ascii_digit()).count();
        if digits > 9 || !matches!(b.get(digits), Some(b'.' | b')')) {
            return None;
        }
        digits + 1
    } else if matches!(b[0], b'-' | b'*' | b'+') {
        1
    } else {
        return None;
    };
    match b.get(len) {
        None => Some(Marker {
            ordered,
            offset: ind + len,
        }),
        Some(b' ' | b'\t') => Some(Marker {
            ordered,
            offset: ind + len + 1,
        }),
        _ => None,
    }
}

fn split_unescaped(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == sep {
            parts.push(&s[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&s[start..]);
    parts
}

fn has_pipe(line: &str) -> bool {
    split_unescaped(line, '|').len() > 1
}

fn split_row(line: &str) -> Vec<&str> {
    let t = line.trim();
    let t = t.strip_prefix('|').unwrap_or(t);
    let t = match t.strip_suffix('|') {
        Some(inner) if !inner.ends_with('\\') => inner,
        _ => t,
    };
    split_unescaped(t, '|')
}

fn is_delimiter_row(line: &str) -> bool {
    line.contains('-')
        && split_row(line).iter().all(|cell| {
            let cell = cell.trim();
            let cell = cell.strip_prefix(':').unwrap_or(cell);
            let cell = cell.strip_suffix(':').unwrap_or(cell);
            !cell.is_empty() && cell.bytes().all(|b| b == b'-')
        })
}

fn is_table_start(lines: &[&str], i: usize) -> bool {
    has_pipe(lines[i]) && lines.get(i + 1).is_some_and(|l| is_delimiter_row(l))
}

/// Whether line `i` starts a block that ends a paragraph
fn interrupts(lines: &[&str], i: usize) -> bool {
    let line = lines[i];
    heading(line).is_some()
        || is_rule(line)
        || quote_content(line).is_some()
        || list_marker(line).is_some()
        || is_table_start(lines, i)
}

/// Strip a trailing hard break marker: two spaces or an unescaped backslash
fn split_hard_break(line: &str) -> (&str, bool) {
    if line.ends_with("  ") {
        return (line.trim_end(), true);
    }
    let trimmed = line.trim_end();
    let backslashes = trimmed.len() - trimmed.trim_end_matches('\\').len();
    if backslashes % 2 == 1 {
        return (&trimmed[..trimmed.len() - 1], true);
    }
    (trimmed, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escape;

    fn md(input: &str) -> String {
        parse(input, UnsafeMarkupPolicy::Strip, &RenderLimits::default())
            .unwrap()
            .to_html()
    }

    #[test]
    fn test_heading_and_paragraph() {
        assert_eq!(
            md("# Terms\n\nPay **within** 30 *days*.\nThanks"),
            "<h1>Terms</h1>\n<p>Pay <strong>within</strong> 30 <em>days</em>. Thanks</p>"
        );
        assert_eq!(md("## Closing ##"), "<h2>Closing</h2>");
        assert_eq!(md("#NoSpace"), "<p>#NoSpace</p>");
    }

    #[test]
    fn test_nested_emphasis() {
        assert_eq!(
            md("*a **b** c*"),
            "<p><em>a <strong>b</strong> c</em></p>"
        );
        assert_eq!(md("__strong__ _em_"), "<p><strong>strong</strong> <em>em</em></p>");
    }

    #[test]
    fn test_unmatched_delimiters_are_text() {
        assert_eq!(md("2 * 3 = 6"), "<p>2 * 3 = 6</p>");
        assert_eq!(md("snake_case_name"), "<p>snake_case_name</p>");
    }

    #[test]
    fn test_lists() {
        assert_eq!(
            md("- one\n- two\n  - nested\n\n1. first\n2. second"),
            "<ul><li>one</li><li><p>two</p>\n<ul><li>nested</li></ul></li></ul>\n<ol><li>first</li><li>second</li></ol>"
        );
    }

    #[test]
    fn test_loose_list_items() {
        assert_eq!(md("- a\n\n- b"), "<ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn test_rules() {
        assert_eq!(md("a\n\n---\n\n* * *"), "<p>a</p>\n<hr>\n<hr>");
    }

    #[test]
    fn test_quote() {
        assert_eq!(
            md("> quoted\n> more"),
            "<blockquote><p>quoted more</p></blockquote>"
        );
    }

    #[test]
    fn test_table_with_escaped_pipe() {
        assert_eq!(
            md("| Item | Note |\n|---|:--:|\n| Widget | a \\| b |"),
            "<table><thead><tr><th>Item</th><th>Note</th></tr></thead><tbody><tr><td>Widget</td><td>a | b</td></tr></tbody></table>"
        );
    }

    #[test]
    fn test_links_vetted() {
        assert_eq!(
            md("[terms](https://example.com/t) and [bad](javascript:evil)"),
            "<p><a href=\"https://example.com/t\">terms</a> and bad</p>"
        );
        assert!(matches!(
            parse("[bad](javascript:evil)", UnsafeMarkupPolicy::Reject, &RenderLimits::default()),
            Err(RenderError::UnsafeMarkupRejected(_))
        ));
    }

    #[test]
    fn test_image_keeps_alt_text() {
        assert_eq!(md("![Logo](logo.png)"), "<p>Logo</p>");
    }

    #[test]
    fn test_raw_html_is_text() {
        assert_eq!(
            md("<script>alert(1)</script>"),
            "<p>&lt;script&gt;alert(1)&lt;/script&gt;</p>"
        );
    }

    #[test]
    fn test_escaped_value_has_no_structure() {
        let value = escape::markdown("# *x* [a](javascript:b)\n- item");
        assert_eq!(md(&value), "<p># *x* [a](javascript:b) - item</p>");
    }

    #[test]
    fn test_hard_breaks() {
        assert_eq!(
            md("line one  \nline two\\\nline three"),
            "<p>line one<br>line two<br>line three</p>"
        );
    }

    #[test]
    fn test_depth_limit() {
        let limits = RenderLimits::with_small_limits();
        assert!(matches!(
            parse(">>>>> deep", UnsafeMarkupPolicy::Strip, &limits),
            Err(RenderError::LimitExceeded { .. })
        ));
        assert!(parse("> shallow", UnsafeMarkupPolicy::Strip, &limits).is_ok());
    }
}
