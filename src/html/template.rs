//! Escape-by-default HTML building.
//!
//! Every dynamic value goes through [`HtmlBuilder::text`], which escapes it.
//! Markup is only inserted verbatim when it is already a [`SafeHtml`]: a
//! static literal, the output of another builder, or content the upstream
//! pipeline has sanitized.

use std::fmt::{self, Write as _};

use serde::Deserialize;

/// Escape HTML special characters (`& < > " '`).
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    push_escaped(&mut out, s);
    out
}

fn push_escaped(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

/// `fmt::Write` adapter that escapes everything written through it.
struct Escaper<'a>(&'a mut String);

impl fmt::Write for Escaper<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        push_escaped(self.0, s);
        Ok(())
    }
}

/// A string known to be safe to insert into a document without escaping.
///
/// Deserializing produces a trusted value: only use it for fields whose
/// producer guarantees sanitized markup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct SafeHtml(String);

impl SafeHtml {
    pub const fn empty() -> Self {
        SafeHtml(String::new())
    }

    /// Fixed markup written into the source.
    pub fn from_static(markup: &'static str) -> Self {
        SafeHtml(markup.to_string())
    }

    /// Markup sanitized by someone else. The caller vouches for it.
    pub fn trusted(markup: impl Into<String>) -> Self {
        SafeHtml(markup.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for SafeHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromIterator<SafeHtml> for SafeHtml {
    fn from_iter<I: IntoIterator<Item = SafeHtml>>(iter: I) -> Self {
        SafeHtml(iter.into_iter().map(SafeHtml::into_string).collect())
    }
}

/// Accumulates a fragment from literals, escaped values and safe fragments.
#[derive(Debug, Default)]
pub struct HtmlBuilder {
    buf: String,
}

impl HtmlBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity),
        }
    }

    /// Append fixed markup.
    pub fn literal(&mut self, markup: &'static str) -> &mut Self {
        self.buf.push_str(markup);
        self
    }

    /// Append a dynamic value, HTML-escaped.
    pub fn text(&mut self, value: impl fmt::Display) -> &mut Self {
        // Writing into a String cannot fail.
        let _ = write!(Escaper(&mut self.buf), "{value}");
        self
    }

    /// Append an already-safe fragment verbatim.
    pub fn raw(&mut self, html: &SafeHtml) -> &mut Self {
        self.buf.push_str(html.as_str());
        self
    }

    /// Append a sequence of safe fragments verbatim, with no separator.
    pub fn raw_all<I>(&mut self, parts: I) -> &mut Self
    where
        I: IntoIterator<Item = SafeHtml>,
    {
        for part in parts {
            self.buf.push_str(part.as_str());
        }
        self
    }

    pub fn finish(self) -> SafeHtml {
        SafeHtml(self.buf)
    }
}
