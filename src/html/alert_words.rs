//! Alert-word highlighting inside trusted message content.
//!
//! Content is HTML, so matching only happens in the text between tags and the
//! alert words are escaped before they are compared with it. A match must start
//! at the beginning of a text run, after whitespace, or after one of
//! `( " . , ' ; [`, and must end at the end of a run, before whitespace, or
//! before one of `) " . , ' ; ]`. Quotes arrive escaped as `&quot;` and `&#39;`;
//! both forms count. Matching ignores case, and the longest word that fits the
//! boundaries wins at each position.

use regex::{Regex, RegexBuilder};
use tracing::{trace, warn};

use crate::model::FlagsState;

use super::collab::AlertWordHighlighter;
use super::template::{SafeHtml, html_escape};

/// Flag set upstream on messages that contain at least one alert word.
pub const HAS_ALERT_WORD_FLAG: &str = "has_alert_word";

const ALERT_OPEN: &str = r#"<span class="alert-word">"#;
const ALERT_CLOSE: &str = "</span>";

// `;` also covers the tail of `&quot;` and `&#39;`.
const LEADING_PUNCTUATION: &[char] = &['(', '"', '.', ',', '\'', ';', '['];
const TRAILING_PUNCTUATION: &[char] = &[')', '"', '.', ',', '\'', ';', ']'];
const TRAILING_ENTITIES: &[&str] = &["&quot;", "&#39;", "&#x27;"];

#[derive(Debug, Clone, Copy, Default)]
pub struct AlertWordMarker;

impl AlertWordHighlighter for AlertWordMarker {
    fn highlight(
        &self,
        content: &SafeHtml,
        message_id: u64,
        alert_words: &[String],
        flags: &FlagsState,
    ) -> SafeHtml {
        if alert_words.is_empty() || !flags.is_set(HAS_ALERT_WORD_FLAG, message_id) {
            return content.clone();
        }
        let matchers = word_matchers(alert_words);
        if matchers.is_empty() {
            return content.clone();
        }

        trace!(
            component = "alert_words",
            operation = "highlight",
            message_id,
            word_count = matchers.len(),
            "Highlighting alert words"
        );

        let source = content.as_str();
        let mut out = String::with_capacity(source.len() + 64);
        for segment in Segments::new(source) {
            match segment {
                Segment::Markup(tag) => out.push_str(tag),
                Segment::Text(text) => mark_text(&matchers, text, &mut out),
            }
        }
        SafeHtml::trusted(out)
    }
}

/// One case-insensitive matcher per non-empty alert word, anchored at the
/// start of its input.
///
/// Longer words come first so that `foo bar` wins over `foo`.
fn word_matchers(alert_words: &[String]) -> Vec<Regex> {
    let mut words: Vec<String> = alert_words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .map(|w| regex::escape(&html_escape(w)))
        .collect();
    words.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    words.dedup();

    words
        .iter()
        .filter_map(|word| {
            match RegexBuilder::new(&format!("^(?:{word})"))
                .case_insensitive(true)
                .build()
            {
                Ok(re) => Some(re),
                Err(err) => {
                    warn!(
                        component = "alert_words",
                        operation = "word_matchers",
                        error = %err,
                        "Could not compile alert-word pattern; skipping word"
                    );
                    None
                }
            }
        })
        .collect()
}

fn mark_text(matchers: &[Regex], text: &str, out: &mut String) {
    let mut last = 0;
    let mut pos = 0;
    while pos < text.len() {
        if starts_on_boundary(text, pos)
            && let Some(end) = match_at(matchers, text, pos)
        {
            out.push_str(&text[last..pos]);
            out.push_str(ALERT_OPEN);
            out.push_str(&text[pos..end]);
            out.push_str(ALERT_CLOSE);
            last = end;
            pos = end;
            continue;
        }
        pos += text[pos..].chars().next().map_or(1, char::len_utf8);
    }
    out.push_str(&text[last..]);
}

/// End of the longest word matching at `start` that also ends on a boundary.
fn match_at(matchers: &[Regex], text: &str, start: usize) -> Option<usize> {
    let rest = &text[start..];
    matchers
        .iter()
        .filter_map(|re| re.find(rest))
        .map(|m| start + m.end())
        .find(|&end| end > start && ends_on_boundary(text, end))
}

fn starts_on_boundary(text: &str, start: usize) -> bool {
    text[..start]
        .chars()
        .next_back()
        .is_none_or(|c| c.is_whitespace() || LEADING_PUNCTUATION.contains(&c))
}

fn ends_on_boundary(text: &str, end: usize) -> bool {
    let rest = &text[end..];
    rest.chars()
        .next()
        .is_none_or(|c| c.is_whitespace() || TRAILING_PUNCTUATION.contains(&c))
        || TRAILING_ENTITIES.iter().any(|entity| rest.starts_with(entity))
}

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Markup(&'a str),
    Text(&'a str),
}

/// Splits HTML into tags and the text runs between them.
///
/// An unterminated `<` swallows the rest of the input as markup, so nothing
/// that might be part of a tag is ever rewritten.
struct Segments<'a> {
    rest: &'a str,
}

impl<'a> Segments<'a> {
    fn new(source: &'a str) -> Self {
        Self { rest: source }
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        if self.rest.starts_with('<') {
            let end = self.rest.find('>').map_or(self.rest.len(), |i| i + 1);
            let (tag, rest) = self.rest.split_at(end);
            self.rest = rest;
            return Some(Segment::Markup(tag));
        }
        let end = self.rest.find('<').unwrap_or(self.rest.len());
        let (text, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(Segment::Text(text))
    }
}
