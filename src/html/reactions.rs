//! Reaction pills, one per distinct emoji.

use tracing::trace;

use crate::model::{Reaction, ReactionType, RealmEmojiTable};

use super::collab::ReactionRenderer;
use super::template::{HtmlBuilder, SafeHtml};

/// Reactions to one message folded by emoji, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AggregatedReaction<'a> {
    name: &'a str,
    code: &'a str,
    kind: ReactionType,
    count: usize,
    self_reacted: bool,
}

fn aggregate<'a>(reactions: &'a [Reaction], own_email: &str) -> Vec<AggregatedReaction<'a>> {
    let mut aggregated: Vec<AggregatedReaction<'a>> = Vec::new();
    for reaction in reactions {
        let by_self = !own_email.is_empty() && reaction.user.email == own_email;
        match aggregated
            .iter_mut()
            .find(|a| a.name == reaction.emoji_name)
        {
            Some(existing) => {
                existing.count += 1;
                existing.self_reacted |= by_self;
            }
            None => aggregated.push(AggregatedReaction {
                name: &reaction.emoji_name,
                code: &reaction.emoji_code,
                kind: reaction.reaction_type,
                count: 1,
                self_reacted: by_self,
            }),
        }
    }
    aggregated
}

/// Decode a unicode emoji code such as `1f44d` or `1f1fa-1f1f8`.
fn decode_emoji_code(code: &str) -> Option<String> {
    if code.is_empty() {
        return None;
    }
    code.split('-')
        .map(|part| u32::from_str_radix(part, 16).ok().and_then(char::from_u32))
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReactionList;

impl ReactionList {
    fn emoji(&self, reaction: &AggregatedReaction<'_>, realm_emoji: &RealmEmojiTable) -> SafeHtml {
        let mut html = HtmlBuilder::new();
        match reaction.kind {
            ReactionType::UnicodeEmoji => match decode_emoji_code(reaction.code) {
                Some(glyph) => {
                    html.text(glyph);
                }
                None => {
                    html.text(format_args!(":{}:", reaction.name));
                }
            },
            ReactionType::RealmEmoji | ReactionType::ZulipExtraEmoji => {
                // Names of deactivated emoji can be reused, ids cannot.
                let custom = realm_emoji.get(reaction.code).or_else(|| {
                    realm_emoji
                        .values()
                        .find(|e| !e.deactivated && e.name == reaction.name)
                });
                match custom {
                    Some(emoji) => {
                        html.literal(r#"<img class="realm-reaction" src=""#)
                            .text(&emoji.source_url)
                            .literal(r#"" alt=""#)
                            .text(format_args!(":{}:", reaction.name))
                            .literal(r#"">"#);
                    }
                    None => {
                        html.text(format_args!(":{}:", reaction.name));
                    }
                }
            }
        }
        html.finish()
    }

    fn pill(&self, reaction: &AggregatedReaction<'_>, realm_emoji: &RealmEmojiTable) -> SafeHtml {
        let mut html = HtmlBuilder::with_capacity(160);
        html.literal(if reaction.self_reacted {
            r#"<span class="reaction self-voted""#
        } else {
            r#"<span class="reaction""#
        })
        .literal(r#" data-name=""#)
        .text(reaction.name)
        .literal(r#"" data-code=""#)
        .text(reaction.code)
        .literal(r#"" data-type=""#)
        .literal(reaction.kind.as_str())
        .literal(r#"">"#)
        .raw(&self.emoji(reaction, realm_emoji))
        .literal("&nbsp;")
        .text(reaction.count)
        .literal("</span>");
        html.finish()
    }
}

impl ReactionRenderer for ReactionList {
    fn reactions(
        &self,
        reactions: &[Reaction],
        message_id: u64,
        own_email: &str,
        realm_emoji: &RealmEmojiTable,
    ) -> SafeHtml {
        if reactions.is_empty() {
            return SafeHtml::empty();
        }
        let aggregated = aggregate(reactions, own_email);
        trace!(
            component = "reactions",
            operation = "render_reactions",
            message_id,
            reactions = reactions.len(),
            pills = aggregated.len(),
            "Rendering reaction list"
        );

        let pills: SafeHtml = aggregated
            .iter()
            .map(|r| self.pill(r, realm_emoji))
            .collect();
        let mut html = HtmlBuilder::with_capacity(pills.len() + 32);
        html.literal(r#"<div class="reaction-list">"#)
            .raw(&pills)
            .literal("</div>");
        html.finish()
    }
}
