//! HTML parsing and sanitization
//!
//! ## Pipeline
//!
//! ```text
//! 1. tokenize()  - text / start tag / end tag; comments and declarations dropped,
//!                  raw-text elements (script, style, ...) skipped with their content
//! 2. build()     - forgiving tree builder: implicit closes, stray end tags ignored
//! 3. Lowerer     - tree → markup::Document, keeping only the safe subset
//! ```
//!
//! Step 3 is where the policy applies. Script-capable constructs are inline
//! event handlers, `javascript:` / `vbscript:` / `data:` URLs, and the
//! elements in `UNSAFE_ELEMENTS`. Under `Strip` they are removed; under
//! `Reject` the first one found fails the render. Unknown tags are unwrapped
//! and their children kept.

use crate::escape::decode_entities;
use crate::markup::{has_content, Block, Cell, Document, Inline, List, Row, Table};
use crate::options::UnsafeMarkupPolicy;
use docket_core::{RenderError, RenderLimits, RenderResult};

/// Elements without an end tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose content is not markup; skipped up to their end tag
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "iframe", "noscript", "noembed", "noframes", "textarea", "title", "xmp",
];

/// Script-capable elements: reported, then dropped with their content
const UNSAFE_ELEMENTS: &[&str] = &[
    "script", "style", "iframe", "frame", "frameset", "object", "embed", "applet", "noscript",
    "template", "svg", "math",
];

/// Elements outside the subset that are dropped with their content
const DISCARDED_ELEMENTS: &[&str] = &[
    "head", "title", "meta", "link", "base", "img", "input", "textarea", "select", "button",
    "audio", "video", "canvas", "source", "track", "param", "area", "map", "noembed",
    "noframes", "xmp",
];

/// Attributes that hold URLs
const URL_ATTRIBUTES: &[&str] = &[
    "href", "src", "action", "formaction", "xlink:href", "background", "poster", "lowsrc",
    "dynsrc", "srcset", "data",
];

/// Schemes that execute code
const SCRIPT_SCHEMES: &[&str] = &["javascript", "vbscript", "data"];

/// Schemes a link may keep
const LINK_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Parse and sanitize HTML into the markup tree
///
/// # Errors
///
/// - `UnsafeMarkupRejected` under `Reject` when a script-capable construct is found
/// - `LimitExceeded` when nesting is deeper than `limits.max_nesting_depth`
pub fn parse(input: &str, policy: UnsafeMarkupPolicy, limits: &RenderLimits) -> RenderResult<Document> {
    let root = build(tokenize(input), limits)?;
    let lowerer = Lowerer { policy };
    Ok(Document::new(lowerer.blocks(&root.children)?))
}

// ============================================================================
// Tokenizer
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Text(String),
    Start {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    End(String),
}

fn tokenize(input: &str) -> Vec<Token> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }

        let rest = &input[i..];
        let markup = if rest.starts_with("<!--") {
            let len = rest[4..].find("-->").map_or(rest.len(), |e| 4 + e + 3);
            Some((len, None))
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            Some((rest.find('>').map_or(rest.len(), |e| e + 1), None))
        } else if rest.starts_with("</") {
            end_tag(rest)
        } else {
            start_tag(rest)
        };

        // A '<' that starts nothing is literal text
        let Some((mut len, token)) = markup else {
            i += 1;
            continue;
        };

        push_text(&mut tokens, &input[text_start..i]);
        if let Some(token) = token {
            let raw_text = match &token {
                Token::Start {
                    name,
                    self_closing: false,
                    ..
                } if RAW_TEXT_ELEMENTS.contains(&name.as_str()) => Some(name.clone()),
                _ => None,
            };
            tokens.push(token);
            if let Some(name) = raw_text {
                len += skip_raw_text(&input[i + len..], &name);
                tokens.push(Token::End(name));
            }
        }
        i += len;
        text_start = i;
    }

    push_text(&mut tokens, &input[text_start..]);
    tokens
}

fn push_text(tokens: &mut Vec<Token>, raw: &str) {
    if !raw.is_empty() {
        tokens.push(Token::Text(decode_entities(raw)));
    }
}

/// Bytes up to and including `</name ...>`, or the whole input if unclosed
fn skip_raw_text(rest: &str, name: &str) -> usize {
    let lowered = rest.to_ascii_lowercase();
    let close = format!("</{}", name);
    match lowered.find(&close) {
        Some(at) => rest[at..].find('>').map_or(rest.len(), |e| at + e + 1),
        None => rest.len(),
    }
}

fn is_space(b: u8) -> bool {
    b.is_ascii_whitespace()
}

fn tag_name(rest: &str, from: usize) -> Option<(String, usize)> {
    let b = rest.as_bytes();
    if from >= b.len() || !b[from].is_ascii_alphabetic() {
        return None;
    }
    let mut j = from;
    while j < b.len() && (b[j].is_ascii_alphanumeric() || b[j] == b'-' || b[j] == b':') {
        j += 1;
    }
    Some((rest[from..j].to_ascii_lowercase(), j))
}

fn end_tag(rest: &str) -> Option<(usize, Option<Token>)> {
    let close = rest.find('>')?;
    match tag_name(rest, 2) {
        Some((name, _)) => Some((close + 1, Some(Token::End(name)))),
        // `</ >` and friends are bogus comments
        None => Some((close + 1, None)),
    }
}

fn start_tag(rest: &str) -> Option<(usize, Option<Token>)> {
    let b = rest.as_bytes();
    let (name, mut j) = tag_name(rest, 1)?;
    let mut attrs = Vec::new();

    loop {
        while j < b.len() && is_space(b[j]) {
            j += 1;
        }
        if j >= b.len() {
            return None;
        }
        match b[j] {
            b'>' => {
                let token = Token::Start {
                    name,
                    attrs,
                    self_closing: false,
                };
                return Some((j + 1, Some(token)));
            }
            b'/' => {
                if b.get(j + 1) == Some(&b'>') {
                    let token = Token::Start {
                        name,
                        attrs,
                        self_closing: true,
                    };
                    return Some((j + 2, Some(token)));
                }
                j += 1;
                continue;
            }
            b'=' => {
                j += 1;
                continue;
            }
            _ => {}
        }

        let name_start = j;
        while j < b.len() && !is_space(b[j]) && !matches!(b[j], b'=' | b'>' | b'/') {
            j += 1;
        }
        let attr_name = rest[name_start..j].to_ascii_lowercase();

        while j < b.len() && is_space(b[j]) {
            j += 1;
        }
        let mut value = "";
        if b.get(j) == Some(&b'=') {
            j += 1;
            while j < b.len() && is_space(b[j]) {
                j += 1;
            }
            match b.get(j) {
                Some(&q) if q == b'"' || q == b'\'' => {
                    let value_start = j + 1;
                    let len = rest[value_start..].find(q as char)?;
                    value = &rest[value_start..value_start + len];
                    j = value_start + len + 1;
                }
                _ => {
                    let value_start = j;
                    while j < b.len() && !is_space(b[j]) && b[j] != b'>' {
                        j += 1;
                    }
                    value = &rest[value_start..j];
                }
            }
        }
        attrs.push((attr_name, decode_entities(value)));
    }
}

// ============================================================================
// Tree builder
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    fn new(name: String, attrs: Vec<(String, String)>) -> Self {
        Element {
            name,
            attrs,
            children: Vec::new(),
        }
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Text(String),
    Element(Element),
}

fn closes_paragraph(name: &str) -> bool {
    matches!(
        name,
        "p" | "div" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "ul" | "ol" | "table"
            | "blockquote" | "hr" | "section" | "article" | "header" | "footer" | "pre"
    )
}

fn build(tokens: Vec<Token>, limits: &RenderLimits) -> RenderResult<Element> {
    let mut stack = vec![Element::new("#root".to_string(), Vec::new())];

    for token in tokens {
        match token {
            Token::Text(t) => push_child(&mut stack, Node::Text(t)),
            Token::Start {
                name,
                attrs,
                self_closing,
            } => {
                implicit_close(&mut stack, &name);
                let element = Element::new(name, attrs);
                if self_closing || VOID_ELEMENTS.contains(&element.name.as_str()) {
                    push_child(&mut stack, Node::Element(element));
                } else {
                    stack.push(element);
                    limits.check_depth(stack.len() - 1)?;
                }
            }
            Token::End(name) => {
                if let Some(pos) = stack.iter().skip(1).rposition(|e| e.name == name) {
                    // rposition over skip(1) is relative to index 1
                    while stack.len() > pos + 1 {
                        pop(&mut stack);
                    }
                }
            }
        }
    }

    while stack.len() > 1 {
        pop(&mut stack);
    }
    Ok(stack.pop().unwrap_or_else(|| Element::new("#root".to_string(), Vec::new())))
}

fn top_is(stack: &[Element], names: &[&str]) -> bool {
    stack.len() > 1 && stack.last().is_some_and(|e| names.contains(&e.name.as_str()))
}

fn implicit_close(stack: &mut Vec<Element>, opening: &str) {
    match opening {
        "li" => {
            if top_is(stack, &["li"]) {
                pop(stack);
            }
        }
        "td" | "th" => {
            if top_is(stack, &["td", "th"]) {
                pop(stack);
            }
        }
        "tr" => {
            if top_is(stack, &["td", "th"]) {
                pop(stack);
            }
            if top_is(stack, &["tr"]) {
                pop(stack);
            }
        }
        "thead" | "tbody" | "tfoot" => {
            if top_is(stack, &["td", "th"]) {
                pop(stack);
            }
            if top_is(stack, &["tr"]) {
                pop(stack);
            }
            if top_is(stack, &["thead", "tbody", "tfoot"]) {
                pop(stack);
            }
        }
        _ => {}
    }
    if closes_paragraph(opening) && top_is(stack, &["p"]) {
        pop(stack);
    }
}

fn push_child(stack: &mut [Element], node: Node) {
    if let Some(top) = stack.last_mut() {
        top.children.push(node);
    }
}

fn pop(stack: &mut Vec<Element>) {
    if stack.len() > 1 {
        if let Some(element) = stack.pop() {
            push_child(stack, Node::Element(element));
        }
    }
}

// ============================================================================
// Lowering to the markup tree
// ============================================================================

/// Scheme of a URL, lowercased, ignoring whitespace and control characters
///
/// Returns None for relative URLs (`/terms`, `#section`, `page.html`).
fn url_scheme(url: &str) -> Option<String> {
    let cleaned: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    let colon = cleaned.find(':')?;
    if cleaned[..colon].contains(['/', '?', '#']) {
        return None;
    }
    Some(cleaned[..colon].to_ascii_lowercase())
}

/// Scheme of a URL that would execute code (`javascript`, `vbscript`, `data`)
pub(crate) fn script_scheme(url: &str) -> Option<String> {
    url_scheme(url).filter(|s| SCRIPT_SCHEMES.contains(&s.as_str()))
}

/// Link target if it is relative or uses an allowed scheme
pub(crate) fn safe_href(href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    match url_scheme(href) {
        None => Some(href.to_string()),
        Some(s) if LINK_SCHEMES.contains(&s.as_str()) => Some(href.to_string()),
        Some(_) => None,
    }
}

struct Lowerer {
    policy: UnsafeMarkupPolicy,
}

impl Lowerer {
    fn finding(&self, what: String) -> RenderResult<()> {
        match self.policy {
            UnsafeMarkupPolicy::Strip => Ok(()),
            UnsafeMarkupPolicy::Reject => Err(RenderError::UnsafeMarkupRejected(what)),
        }
    }

    /// Report unsafe constructs on an element; false if it is dropped entirely
    fn vet(&self, el: &Element) -> RenderResult<bool> {
        for (name, value) in &el.attrs {
            if name.starts_with("on") {
                self.finding(format!("inline event handler '{}' on <{}>", name, el.name))?;
            }
            if URL_ATTRIBUTES.contains(&name.as_str()) {
                if let Some(scheme) = script_scheme(value) {
                    self.finding(format!("{}: URL in '{}' on <{}>", scheme, name, el.name))?;
                }
            }
        }
        if UNSAFE_ELEMENTS.contains(&el.name.as_str()) {
            self.finding(format!("<{}> element", el.name))?;
            return Ok(false);
        }
        Ok(!DISCARDED_ELEMENTS.contains(&el.name.as_str()))
    }

    fn blocks(&self, nodes: &[Node]) -> RenderResult<Vec<Block>> {
        let mut out = Vec::new();
        let mut run = Vec::new();
        self.collect_blocks(nodes, &mut out, &mut run)?;
        flush(&mut out, &mut run);
        Ok(out)
    }

    fn collect_blocks(&self, nodes: &[Node], out: &mut Vec<Block>, run: &mut Vec<Inline>) -> RenderResult<()> {
        for node in nodes {
            let el = match node {
                Node::Text(t) => {
                    run.push(Inline::Text(t.clone()));
                    continue;
                }
                Node::Element(el) => el,
            };
            if !self.vet(el)? {
                continue;
            }
            match el.name.as_str() {
                "p" => {
                    flush(out, run);
                    let content = self.inlines(&el.children)?;
                    if has_content(&content) {
                        out.push(Block::Paragraph(content));
                    }
                }
                "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                    flush(out, run);
                    let level = el.name.as_bytes()[1] - b'0';
                    out.push(Block::Heading {
                        level,
                        content: self.inlines(&el.children)?,
                    });
                }
                "ul" | "ol" => {
                    flush(out, run);
                    out.push(Block::List(self.list(el)?));
                }
                "blockquote" => {
                    flush(out, run);
                    out.push(Block::Quote(self.blocks(&el.children)?));
                }
                "table" => {
                    flush(out, run);
                    out.push(Block::Table(self.table(el)?));
                }
                "hr" => {
                    flush(out, run);
                    out.push(Block::Rule);
                }
                "div" | "section" | "article" | "header" | "footer" | "main" | "aside" | "nav"
                | "body" | "html" | "center" | "figure" | "figcaption" | "address" | "pre"
                | "dl" | "dt" | "dd" | "li" | "form" | "fieldset" | "details" | "summary" => {
                    flush(out, run);
                    self.collect_blocks(&el.children, out, run)?;
                    flush(out, run);
                }
                _ => run.extend(self.inline_element(el)?),
            }
        }
        Ok(())
    }

    fn inlines(&self, nodes: &[Node]) -> RenderResult<Vec<Inline>> {
        let mut out = Vec::new();
        for node in nodes {
            match node {
                Node::Text(t) => out.push(Inline::Text(t.clone())),
                Node::Element(el) => {
                    if self.vet(el)? {
                        out.extend(self.inline_element(el)?);
                    }
                }
            }
        }
        Ok(out)
    }

    fn inline_element(&self, el: &Element) -> RenderResult<Vec<Inline>> {
        Ok(match el.name.as_str() {
            "em" | "i" | "cite" | "var" | "dfn" => vec![Inline::Emphasis(self.inlines(&el.children)?)],
            "strong" | "b" => vec![Inline::Strong(self.inlines(&el.children)?)],
            "a" => vec![Inline::Link {
                href: el.attr("href").and_then(safe_href),
                content: strip_links(self.inlines(&el.children)?),
            }],
            "br" => vec![Inline::Break],
            "hr" => Vec::new(),
            // Unknown and block elements in inline context are unwrapped
            _ => self.inlines(&el.children)?,
        })
    }

    fn list(&self, el: &Element) -> RenderResult<List> {
        let mut items = Vec::new();
        for child in &el.children {
            match child {
                Node::Element(li) if li.name == "li" => {
                    if self.vet(li)? {
                        items.push(self.blocks(&li.children)?);
                    }
                }
                Node::Text(t) if t.trim().is_empty() => {}
                other => {
                    let blocks = self.blocks(std::slice::from_ref(other))?;
                    if !blocks.is_empty() {
                        items.push(blocks);
                    }
                }
            }
        }
        Ok(List {
            ordered: el.name == "ol",
            items,
        })
    }

    fn table(&self, el: &Element) -> RenderResult<Table> {
        let mut table = Table::default();
        self.table_rows(&el.children, false, &mut table)?;
        Ok(table)
    }

    /// Collect rows; text and other content directly inside the table is discarded
    fn table_rows(&self, nodes: &[Node], in_head: bool, table: &mut Table) -> RenderResult<()> {
        for node in nodes {
            let Node::Element(child) = node else { continue };
            if !self.vet(child)? {
                continue;
            }
            match child.name.as_str() {
                "thead" => self.table_rows(&child.children, true, table)?,
                "tbody" | "tfoot" => self.table_rows(&child.children, in_head, table)?,
                "tr" => {
                    let row = self.row(&child.children)?;
                    if in_head {
                        table.head.push(row);
                    } else {
                        table.body.push(row);
                    }
                }
                "td" | "th" => {
                    let row = self.row(std::slice::from_ref(node))?;
                    table.body.push(row);
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn row(&self, nodes: &[Node]) -> RenderResult<Row> {
        let mut cells = Vec::new();
        for node in nodes {
            let Node::Element(cell) = node else { continue };
            if matches!(cell.name.as_str(), "td" | "th") && self.vet(cell)? {
                cells.push(Cell {
                    header: cell.name == "th",
                    content: self.inlines(&cell.children)?,
                });
            }
        }
        Ok(Row::new(cells))
    }
}

/// Turn a pending inline run into a paragraph if it shows anything
fn flush(out: &mut Vec<Block>, run: &mut Vec<Inline>) {
    if run.is_empty() {
        return;
    }
    let content = std::mem::take(run);
    if has_content(&content) {
        out.push(Block::Paragraph(content));
    }
}

/// Links cannot nest; inner links keep only their text
fn strip_links(inlines: Vec<Inline>) -> Vec<Inline> {
    inlines
        .into_iter()
        .flat_map(|inline| match inline {
            Inline::Link { content, .. } => strip_links(content),
            Inline::Emphasis(c) => vec![Inline::Emphasis(strip_links(c))],
            Inline::Strong(c) => vec![Inline::Strong(strip_links(c))],
            other => vec![other],
        })
        .collect()
}
