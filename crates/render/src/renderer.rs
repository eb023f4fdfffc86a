//! Template renderer
//!
//! `Renderer::render` is a pure function of `(template, context, options)`:
//! the same inputs always produce byte-identical output.

use crate::escape;
use crate::markup::Document;
use crate::options::RenderOptions;
use crate::placeholder::{scan, Segment};
use crate::{html, markdown};
use docket_core::{ContextValue, MarkupFormat, RenderError, RenderResult, Template, VariableContext};
use std::fmt;

/// Sanitized HTML produced by a render
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderedMarkup(String);

impl RenderedMarkup {
    /// Wrap markup that is already sanitized
    pub(crate) fn new(markup: String) -> Self {
        RenderedMarkup(markup)
    }

    /// Borrow the markup
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the markup
    pub fn into_string(self) -> String {
        self.0
    }

    /// True when nothing survived sanitization
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RenderedMarkup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Document> for RenderedMarkup {
    fn from(doc: Document) -> Self {
        RenderedMarkup(doc.to_html())
    }
}

/// Renders templates against a variable context
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    /// Renderer with the given options
    pub fn new(options: RenderOptions) -> Self {
        Renderer { options }
    }

    /// Options in effect
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render a template
    ///
    /// # Errors
    ///
    /// - `LimitExceeded` for oversized content, too many placeholders, or deep nesting
    /// - `MalformedPlaceholder` for an unterminated `{{` or an invalid key
    /// - `UnresolvedVariable` for a key the context does not bind
    /// - `UnsafeMarkupRejected` under the `Reject` policy
    pub fn render(&self, template: &Template, context: &VariableContext) -> RenderResult<RenderedMarkup> {
        self.render_content(&template.content, template.format, context)
    }

    /// Render raw content in the given format
    pub fn render_content(
        &self,
        content: &str,
        format: MarkupFormat,
        context: &VariableContext,
    ) -> RenderResult<RenderedMarkup> {
        let limits = &self.options.limits;
        limits.check_template_bytes(content.len())?;

        let segments = scan(content)?;
        let placeholders = segments
            .iter()
            .filter(|s| matches!(s, Segment::Placeholder { .. }))
            .count();
        limits.check_placeholders(placeholders)?;

        let substituted = self.substitute(&segments, format, context)?;
        Ok(self.sanitize(&substituted, format)?.into())
    }

    /// Parse markup into the safe tree, applying the unsafe markup policy
    pub fn sanitize(&self, markup: &str, format: MarkupFormat) -> RenderResult<Document> {
        match format {
            MarkupFormat::Html => html::parse(markup, self.options.policy, &self.options.limits),
            MarkupFormat::Markdown => markdown::parse(markup, self.options.policy, &self.options.limits),
        }
    }

    /// Text a value prints as, before escaping
    pub fn display(&self, value: &ContextValue) -> String {
        match value {
            ContextValue::Text(s) => s.clone(),
            ContextValue::Number(d) => d.to_string(),
            ContextValue::Date(d) => self.options.date_format.format(*d),
        }
    }

    /// Single pass: values are escaped and never rescanned
    fn substitute(
        &self,
        segments: &[Segment<'_>],
        format: MarkupFormat,
        context: &VariableContext,
    ) -> RenderResult<String> {
        let mut out = String::new();
        for segment in segments {
            match *segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder { key, .. } => {
                    let value = context
                        .get(key)
                        .ok_or_else(|| RenderError::UnresolvedVariable(key.to_string()))?;
                    let text = self.display(value);
                    match format {
                        MarkupFormat::Html => out.push_str(&escape::html(&text)),
                        MarkupFormat::Markdown => out.push_str(&escape::markdown(&text)),
                    }
                }
            }
        }
        Ok(out)
    }
}

/// Render with default options
pub fn render(template: &Template, context: &VariableContext) -> RenderResult<RenderedMarkup> {
    Renderer::default().render(template, context)
}
