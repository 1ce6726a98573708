//! Starred / edited badges.

use super::collab::TagRenderer;
use super::template::{HtmlBuilder, SafeHtml};

const EDITED_TAG: &str = r#"<span class="message-tag">edited</span>"#;
const STARRED_TAG: &str = r#"<span class="message-tag">starred</span>"#;

#[derive(Debug, Clone, Copy, Default)]
pub struct MessageTags;

impl TagRenderer for MessageTags {
    fn tags(&self, starred: bool, time_edited: Option<i64>) -> SafeHtml {
        let mut tags = Vec::with_capacity(2);
        if time_edited.is_some() {
            tags.push(SafeHtml::from_static(EDITED_TAG));
        }
        if starred {
            tags.push(SafeHtml::from_static(STARRED_TAG));
        }
        if tags.is_empty() {
            return SafeHtml::empty();
        }

        let mut html = HtmlBuilder::with_capacity(128);
        html.literal(r#"<div class="message-tags">"#)
            .raw_all(tags)
            .literal("</div>");
        html.finish()
    }
}
