//! Safe markup tree
//!
//! Every renderable document passes through this tree. It has a variant for
//! each construct in the safe subset and nothing else: no attributes beyond
//! a vetted link target, no raw HTML node, no script or style. Serializing
//! the tree therefore can only ever produce the safe subset.

use crate::escape;
use serde::{Deserialize, Serialize};

/// Inline content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Inline {
    /// Plain text, escaped on output
    Text(String),
    /// `<em>`
    Emphasis(Vec<Inline>),
    /// `<strong>`
    Strong(Vec<Inline>),
    /// `<a href>`; `href` is already vetted
    Link {
        /// Allowed target, or None when the original was dropped
        href: Option<String>,
        /// Link text
        content: Vec<Inline>,
    },
    /// `<br>`
    Break,
}

impl Inline {
    /// Text node
    pub fn text(s: impl Into<String>) -> Self {
        Inline::Text(s.into())
    }

    fn is_blank(&self) -> bool {
        match self {
            Inline::Text(t) => t.trim().is_empty(),
            Inline::Break => false,
            Inline::Emphasis(c) | Inline::Strong(c) | Inline::Link { content: c, .. } => {
                c.iter().all(Inline::is_blank)
            }
        }
    }
}

/// Table cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// `<th>` rather than `<td>`
    pub header: bool,
    /// Cell content
    pub content: Vec<Inline>,
}

impl Cell {
    /// `<td>` with text
    pub fn data(text: impl Into<String>) -> Self {
        Cell {
            header: false,
            content: vec![Inline::text(text)],
        }
    }

    /// `<th>` with text
    pub fn header(text: impl Into<String>) -> Self {
        Cell {
            header: true,
            content: vec![Inline::text(text)],
        }
    }
}

/// Table row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Cells left to right
    pub cells: Vec<Cell>,
}

impl Row {
    /// Row from cells
    pub fn new(cells: Vec<Cell>) -> Self {
        Row { cells }
    }
}

/// Table with optional header rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// `<thead>` rows
    pub head: Vec<Row>,
    /// `<tbody>` rows
    pub body: Vec<Row>,
}

/// Bulleted or numbered list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    /// `<ol>` rather than `<ul>`
    pub ordered: bool,
    /// Items, each a sequence of blocks
    pub items: Vec<Vec<Block>>,
}

/// Block content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Block {
    /// `<p>`
    Paragraph(Vec<Inline>),
    /// `<h1>`..`<h6>`
    Heading {
        /// 1..=6
        level: u8,
        /// Heading text
        content: Vec<Inline>,
    },
    /// `<table>`
    Table(Table),
    /// `<ul>` / `<ol>`
    List(List),
    /// `<blockquote>`
    Quote(Vec<Block>),
    /// `<hr>`
    Rule,
}

impl Block {
    /// Paragraph holding one text node
    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph(vec![Inline::text(text)])
    }

    /// Heading holding one text node, level clamped to 1..=6
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Block::Heading {
            level: level.clamp(1, 6),
            content: vec![Inline::text(text)],
        }
    }
}

/// Sanitized document: a sequence of blocks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Top-level blocks in order
    pub blocks: Vec<Block>,
}

impl Document {
    /// Document from blocks
    pub fn new(blocks: Vec<Block>) -> Self {
        Document { blocks }
    }

    /// Serialize to HTML, one top-level block per line
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_blocks(&mut out, &self.blocks);
        out
    }
}

/// True when inline content carries something visible
pub(crate) fn has_content(inlines: &[Inline]) -> bool {
    !inlines.iter().all(Inline::is_blank)
}

fn write_blocks(out: &mut String, blocks: &[Block]) {
    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        write_block(out, block);
    }
}

fn write_block(out: &mut String, block: &Block) {
    match block {
        Block::Paragraph(content) => {
            out.push_str("<p>");
            write_inlines(out, content);
            out.push_str("</p>");
        }
        Block::Heading { level, content } => {
            let level = (*level).clamp(1, 6);
            out.push_str(&format!("<h{}>", level));
            write_inlines(out, content);
            out.push_str(&format!("</h{}>", level));
        }
        Block::Table(table) => {
            out.push_str("<table>");
            if !table.head.is_empty() {
                out.push_str("<thead>");
                write_rows(out, &table.head);
                out.push_str("</thead>");
            }
            if !table.body.is_empty() {
                out.push_str("<tbody>");
                write_rows(out, &table.body);
                out.push_str("</tbody>");
            }
            out.push_str("</table>");
        }
        Block::List(list) => {
            let tag = if list.ordered { "ol" } else { "ul" };
            out.push_str(&format!("<{}>", tag));
            for item in &list.items {
                out.push_str("<li>");
                match item.as_slice() {
                    // A lone paragraph renders inline: <li>text</li>
                    [Block::Paragraph(content)] => write_inlines(out, content),
                    blocks => write_blocks(out, blocks),
                }
                out.push_str("</li>");
            }
            out.push_str(&format!("</{}>", tag));
        }
        Block::Quote(blocks) => {
            out.push_str("<blockquote>");
            write_blocks(out, blocks);
            out.push_str("</blockquote>");
        }
        Block::Rule => out.push_str("<hr>"),
    }
}

fn write_rows(out: &mut String, rows: &[Row]) {
    for row in rows {
        out.push_str("<tr>");
        for cell in &row.cells {
            let tag = if cell.header { "th" } else { "td" };
            out.push_str(&format!("<{}>", tag));
            write_inlines(out, &cell.content);
            out.push_str(&format!("</{}>", tag));
        }
        out.push_str("</tr>");
    }
}

fn write_inlines(out: &mut String, inlines: &[Inline]) {
    for inline in inlines {
        match inline {
            Inline::Text(t) => out.push_str(&escape::html(t)),
            Inline::Emphasis(c) => {
                out.push_str("<em>");
                write_inlines(out, c);
                out.push_str("</em>");
            }
            Inline::Strong(c) => {
                out.push_str("<strong>");
                write_inlines(out, c);
                out.push_str("</strong>");
            }
            Inline::Link { href: Some(href), content } => {
                out.push_str("<a href=\"");
                out.push_str(&escape::html(href));
                out.push_str("\">");
                write_inlines(out, content);
                out.push_str("</a>");
            }
            Inline::Link { href: None, content } => write_inlines(out, content),
            Inline::Break => out.push_str("<br>"),
        }
    }
}
