//! Message record to HTML fragment rendering.
//!
//! One call renders exactly one message, either as a *brief* continuation of a
//! sender group or as the *full* first message of a group (avatar, sender name
//! and time). Untrusted fields are always escaped; only the message content and
//! fragments produced by collaborators are inserted verbatim.
//!
//! ```text
//! <div class="message message-full" id="msg-7" data-msg-id="7" data-starred="true">
//!   <div class="avatar"><img ...></div>          (full only)
//!   <div class="content">
//!     <div class="subheader">...</div>           (full only)
//!     content | outbox spinner | tags | reactions
//!   </div>
//! </div>
//! ```

use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::model::{FlagsState, MessageRenderData, RenderContext};

use super::collab::{Collaborators, TimeFormatter};
use super::template::{HtmlBuilder, SafeHtml};

/// Shown after the content of messages still waiting in the outbox.
pub const OUTBOX_SPINNER: &str = r#"<div class="loading-spinner outbox-spinner"></div>"#;

pub const STARRED_FLAG: &str = "starred";

/// Presentation mode of a message inside its sender group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageVariant {
    /// Continues the previous sender's group: no avatar, no subheader.
    Brief,
    /// Starts a sender group.
    Full,
}

impl MessageVariant {
    pub fn of(message: &MessageRenderData) -> Self {
        if message.is_brief {
            MessageVariant::Brief
        } else {
            MessageVariant::Full
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            MessageVariant::Brief => "message-brief",
            MessageVariant::Full => "message-full",
        }
    }
}

/// Names of the flags set for message `id`, in declaration order.
pub fn flag_names(flags: &FlagsState, id: u64) -> Vec<&str> {
    flags
        .iter()
        .filter(|(_, ids)| ids.get(&id).copied().unwrap_or(false))
        .map(|(name, _)| name)
        .collect()
}

/// Flag names become attribute names. Anything the HTML attribute-name grammar
/// allows is kept, including dots and non-ASCII letters; whitespace, controls,
/// noncharacters and `" ' < > / =` are not.
fn is_attribute_name_safe(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|c| {
            !c.is_whitespace()
                && !c.is_control()
                && !matches!(c, '"' | '\'' | '>' | '/' | '=' | '<')
                && !is_noncharacter(c)
        })
}

fn is_noncharacter(c: char) -> bool {
    let cp = u32::from(c);
    (0xFDD0..=0xFDEF).contains(&cp) || cp & 0xFFFE == 0xFFFE
}

fn flag_attribute(name: &str) -> Option<SafeHtml> {
    if !is_attribute_name_safe(name) {
        warn!(
            component = "renderer",
            operation = "flag_attribute",
            flag = name,
            "Skipping flag whose name is not a valid data attribute"
        );
        return None;
    }
    Some(SafeHtml::trusted(format!(r#" data-{name}="true""#)))
}

/// Opening container tag for a message. The caller closes it.
pub fn message_div(id: u64, variant: MessageVariant, flags: &FlagsState) -> SafeHtml {
    let mut html = HtmlBuilder::with_capacity(128);
    html.literal(r#"<div class="message "#)
        .literal(variant.css_class())
        .literal(r#"" id="msg-"#)
        .text(id)
        .literal(r#"" data-msg-id=""#)
        .text(id)
        .literal("\"")
        .raw_all(flag_names(flags, id).into_iter().filter_map(flag_attribute))
        .literal(">");
    html.finish()
}

/// Sender name and time label shown at the top of a full message.
pub fn message_subheader(
    from_name: &str,
    timestamp: i64,
    twenty_four_hour_time: bool,
    time: &dyn TimeFormatter,
) -> SafeHtml {
    let label = time.short_time(timestamp.saturating_mul(1000), twenty_four_hour_time);
    let mut html = HtmlBuilder::with_capacity(128 + from_name.len());
    html.literal(r#"<div class="subheader"><div class="username">"#)
        .text(from_name)
        .literal(r#"</div><div class="timestamp">"#)
        .text(label)
        .literal("</div></div>");
    html.finish()
}

/// Content, outbox spinner, tags and reactions, always in that order.
pub fn message_body(
    context: &RenderContext,
    message: &MessageRenderData,
    collaborators: &Collaborators,
) -> SafeHtml {
    let id = message.id;
    let content =
        collaborators
            .highlighter
            .highlight(&message.content, id, &context.alert_words, &context.flags);
    let outbox = if message.is_outbox {
        SafeHtml::from_static(OUTBOX_SPINNER)
    } else {
        SafeHtml::empty()
    };
    let tags = collaborators
        .tags
        .tags(context.flags.is_set(STARRED_FLAG, id), message.time_edited);
    let reactions = collaborators.reactions.reactions(
        &message.reactions,
        id,
        &context.own_email,
        &context.realm_emoji,
    );

    let mut html = HtmlBuilder::with_capacity(
        content.len() + outbox.len() + tags.len() + reactions.len(),
    );
    html.raw_all([content, outbox, tags, reactions]);
    html.finish()
}

/// Renders messages with a fixed set of collaborators.
#[derive(Debug, Default)]
pub struct MessageRenderer {
    collaborators: Collaborators,
}

impl MessageRenderer {
    pub fn new(collaborators: Collaborators) -> Self {
        Self { collaborators }
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    /// Render one message to an HTML fragment.
    pub fn render(&self, context: &RenderContext, message: &MessageRenderData) -> String {
        let started = Instant::now();
        let variant = MessageVariant::of(message);
        trace!(
            component = "renderer",
            operation = "render_message",
            message_id = message.id,
            variant = ?variant,
            content_len = message.content.len(),
            reactions = message.reactions.len(),
            "Rendering message"
        );

        let html = match variant {
            MessageVariant::Brief => self.brief(context, message),
            MessageVariant::Full => self.full(context, message),
        };

        debug!(
            component = "renderer",
            operation = "render_message_complete",
            message_id = message.id,
            duration_ms = started.elapsed().as_millis(),
            bytes = html.len(),
            "Message rendered"
        );

        html.into_string()
    }

    fn brief(&self, context: &RenderContext, message: &MessageRenderData) -> SafeHtml {
        let mut html = HtmlBuilder::with_capacity(message.content.len() + 256);
        html.raw(&message_div(message.id, MessageVariant::Brief, &context.flags))
            .literal(r#"<div class="content">"#)
            .raw(&message_body(context, message, &self.collaborators))
            .literal("</div></div>");
        html.finish()
    }

    fn full(&self, context: &RenderContext, message: &MessageRenderData) -> SafeHtml {
        let mut html = HtmlBuilder::with_capacity(message.content.len() + 512);
        html.raw(&message_div(message.id, MessageVariant::Full, &context.flags))
            .literal(r#"<div class="avatar"><img src=""#)
            .text(&message.avatar_url)
            .literal(r#"" alt=""#)
            .text(&message.from_name)
            .literal(r#"" class="avatar-img" data-email=""#)
            .text(&message.from_email)
            .literal(r#""></div><div class="content">"#)
            .raw(&message_subheader(
                &message.from_name,
                message.timestamp,
                context.twenty_four_hour_time,
                self.collaborators.time.as_ref(),
            ))
            .raw(&message_body(context, message, &self.collaborators))
            .literal("</div></div>");
        html.finish()
    }
}

/// Render one message with the default collaborators.
pub fn render_message(context: &RenderContext, message: &MessageRenderData) -> String {
    MessageRenderer::default().render(context, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::collab::{AlertWordHighlighter, ReactionRenderer, TagRenderer};
    use crate::model::{Reaction, RealmEmojiTable};

    struct FixedTime;

    impl TimeFormatter for FixedTime {
        fn short_time(&self, instant_ms: i64, use_24h: bool) -> String {
            format!("t{instant_ms}{}", if use_24h { "h" } else { "a" })
        }
    }

    struct MarkContent;

    impl AlertWordHighlighter for MarkContent {
        fn highlight(&self, content: &SafeHtml, _: u64, _: &[String], _: &FlagsState) -> SafeHtml {
            SafeHtml::trusted(format!("<i data-part=\"content\">{content}</i>"))
        }
    }

    struct MarkTags;

    impl TagRenderer for MarkTags {
        fn tags(&self, starred: bool, time_edited: Option<i64>) -> SafeHtml {
            SafeHtml::trusted(format!(
                "<i data-part=\"tags\" data-starred-tag=\"{starred}\" data-edited=\"{}\"></i>",
                time_edited.is_some()
            ))
        }
    }

    struct MarkReactions;

    impl ReactionRenderer for MarkReactions {
        fn reactions(&self, r: &[Reaction], id: u64, own: &str, _: &RealmEmojiTable) -> SafeHtml {
            SafeHtml::trusted(format!(
                "<i data-part=\"reactions\" data-n=\"{}\" data-for=\"{id}\" data-own=\"{}\"></i>",
                r.len(),
                own.len()
            ))
        }
    }

    fn marking_renderer() -> MessageRenderer {
        MessageRenderer::new(
            Collaborators::default()
                .with_time(FixedTime)
                .with_highlighter(MarkContent)
                .with_tags(MarkTags)
                .with_reactions(MarkReactions),
        )
    }

    fn test_message(id: u64, is_brief: bool) -> MessageRenderData {
        MessageRenderData {
            content: SafeHtml::trusted("<p>hi</p>"),
            id,
            is_outbox: false,
            reactions: Vec::new(),
            time_edited: None,
            from_name: "Ada Lovelace".to_string(),
            from_email: "ada@example.com".to_string(),
            timestamp: 1_500_000_000,
            avatar_url: "https://example.com/ada.png".to_string(),
            is_brief,
        }
    }

    #[test]
    fn test_flag_names_filters_false_and_missing() {
        let flags = FlagsState::new()
            .with("read", 1, true)
            .with("starred", 1, false)
            .with("mentioned", 2, true)
            .with("collapsed", 1, true);
        assert_eq!(flag_names(&flags, 1), vec!["read", "collapsed"]);
        assert_eq!(flag_names(&flags, 2), vec!["mentioned"]);
        assert!(flag_names(&flags, 3).is_empty());
    }

    #[test]
    fn test_message_div_attributes() {
        let flags = FlagsState::new()
            .with("read", 42, true)
            .with("starred", 42, true);
        let html = message_div(42, MessageVariant::Brief, &flags);
        assert_eq!(
            html.as_str(),
            r#"<div class="message message-brief" id="msg-42" data-msg-id="42" data-read="true" data-starred="true">"#
        );
    }

    #[test]
    fn test_message_div_forward_compatible_flags() {
        let flags = FlagsState::new().with("some_future_flag", 5, true);
        let html = message_div(5, MessageVariant::Full, &flags);
        assert!(html.as_str().contains(r#"data-some_future_flag="true""#));
    }

    #[test]
    fn test_message_div_skips_unsafe_flag_names() {
        let flags = FlagsState::new()
            .with(r#"x" onclick="alert(1)"#, 5, true)
            .with("read", 5, true);
        let html = message_div(5, MessageVariant::Full, &flags);
        assert!(!html.as_str().contains("onclick"));
        assert!(html.as_str().contains(r#"data-read="true">"#));
    }

    #[test]
    fn test_message_div_keeps_dotted_and_unicode_flag_names() {
        let flags = FlagsState::new()
            .with("ext.pinned", 5, true)
            .with("gelesen", 5, true)
            .with("überprüft", 5, true);
        let html = message_div(5, MessageVariant::Brief, &flags);
        assert!(html.as_str().ends_with(
            r#" data-ext.pinned="true" data-gelesen="true" data-überprüft="true">"#
        ));
    }

    #[test]
    fn test_attribute_name_grammar() {
        for name in ["read", "ext.pinned", "a:b", "ü", "has_alert_word", "x-y"] {
            assert!(is_attribute_name_safe(name), "{name}");
        }
        for name in ["", "a b", "a\tb", "a\"b", "a'b", "a>b", "a/b", "a=b", "a<b", "a\u{0}b", "a\u{fdd0}"] {
            assert!(!is_attribute_name_safe(name), "{name:?}");
        }
    }

    #[test]
    fn test_subheader_escapes_name_and_passes_millis() {
        let html = message_subheader("<b>Eve</b>", 1_500_000_000, true, &FixedTime);
        assert_eq!(
            html.as_str(),
            r#"<div class="subheader"><div class="username">&lt;b&gt;Eve&lt;/b&gt;</div><div class="timestamp">t1500000000000h</div></div>"#
        );
    }

    #[test]
    fn test_body_order() {
        let mut message = test_message(8, true);
        message.is_outbox = true;
        let context = RenderContext::default();
        let body = message_body(&context, &message, marking_renderer().collaborators());
        let text = body.as_str();
        let content = text.find(r#"data-part="content""#).unwrap();
        let spinner = text.find(OUTBOX_SPINNER).unwrap();
        let tags = text.find(r#"data-part="tags""#).unwrap();
        let reactions = text.find(r#"data-part="reactions""#).unwrap();
        assert!(content < spinner && spinner < tags && tags < reactions);
    }

    #[test]
    fn test_body_passes_context_to_collaborators() {
        let mut message = test_message(8, true);
        message.time_edited = Some(1_500_000_100);
        let context = RenderContext {
            own_email: "me@example.com".to_string(),
            flags: FlagsState::new().with(STARRED_FLAG, 8, true),
            ..Default::default()
        };
        let body = message_body(&context, &message, marking_renderer().collaborators());
        assert!(body.as_str().contains(r#"data-starred-tag="true" data-edited="true""#));
        assert!(body.as_str().contains(r#"data-for="8" data-own="14""#));
    }

    #[test]
    fn test_outbox_spinner_count() {
        let renderer = marking_renderer();
        let context = RenderContext::default();
        let mut message = test_message(1, false);
        assert_eq!(renderer.render(&context, &message).matches(OUTBOX_SPINNER).count(), 0);
        message.is_outbox = true;
        assert_eq!(renderer.render(&context, &message).matches(OUTBOX_SPINNER).count(), 1);
    }

    #[test]
    fn test_brief_structure() {
        let html = marking_renderer().render(&RenderContext::default(), &test_message(3, true));
        assert!(html.starts_with(r#"<div class="message message-brief" id="msg-3""#));
        assert!(html.contains(r#"<div class="content"><i data-part="content"><p>hi</p></i>"#));
        assert!(html.ends_with("</div></div>"));
        assert!(!html.contains("avatar"));
        assert!(!html.contains("subheader"));
    }

    #[test]
    fn test_full_structure() {
        let context = RenderContext {
            twenty_four_hour_time: true,
            ..Default::default()
        };
        let html = marking_renderer().render(&context, &test_message(3, false));
        assert!(html.starts_with(r#"<div class="message message-full" id="msg-3""#));
        assert!(html.contains(
            r#"<div class="avatar"><img src="https://example.com/ada.png" alt="Ada Lovelace" class="avatar-img" data-email="ada@example.com"></div>"#
        ));
        let subheader = html.find(r#"<div class="subheader">"#).unwrap();
        let content = html.find(r#"data-part="content""#).unwrap();
        assert!(subheader < content);
        assert!(html.contains("t1500000000000h"));
        assert!(html.ends_with("</div></div>"));
    }

    #[test]
    fn test_full_escapes_untrusted_fields() {
        let mut message = test_message(3, false);
        message.from_name = "<script>".to_string();
        message.from_email = r#"a"b@example.com"#.to_string();
        message.avatar_url = r#"x" onerror="steal()"#.to_string();
        let html = render_message(&RenderContext::default(), &message);
        assert!(!html.contains("<script>"));
        assert_eq!(html.matches("&lt;script&gt;").count(), 2);
        assert!(html.contains(r#"data-email="a&quot;b@example.com""#));
        assert!(html.contains(r#"src="x&quot; onerror=&quot;steal()""#));
    }

    #[test]
    fn test_variant_selection() {
        assert_eq!(MessageVariant::of(&test_message(1, true)), MessageVariant::Brief);
        assert_eq!(MessageVariant::of(&test_message(1, false)), MessageVariant::Full);
        assert_eq!(MessageVariant::Brief.css_class(), "message-brief");
        assert_eq!(MessageVariant::Full.css_class(), "message-full");
    }

    #[test]
    fn test_render_is_deterministic() {
        let context = RenderContext {
            flags: FlagsState::new().with(STARRED_FLAG, 1, true),
            ..Default::default()
        };
        let message = test_message(1, false);
        assert_eq!(render_message(&context, &message), render_message(&context, &message));
    }

    #[test]
    fn test_subheader_timestamp_overflow_does_not_panic() {
        let html = message_subheader("a", i64::MAX, false, &FixedTime);
        assert!(html.as_str().contains(&format!("t{}a", i64::MAX)));
    }
}
