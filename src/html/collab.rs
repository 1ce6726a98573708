//! Seams to the renderers the message composer delegates to.
//!
//! The composer only relies on each collaborator returning safe markup; how
//! times are formatted, which words match, or how badges and pills look is
//! owned by the implementations.

use crate::model::{FlagsState, Reaction, RealmEmojiTable};

use super::alert_words::AlertWordMarker;
use super::reactions::ReactionList;
use super::tags::MessageTags;
use super::template::SafeHtml;
use super::time::ShortTime;

/// Formats a short, localized time-of-day label.
pub trait TimeFormatter: Send + Sync {
    /// `instant_ms` is milliseconds since the Unix epoch.
    fn short_time(&self, instant_ms: i64, use_24h: bool) -> String;
}

/// Highlights alert words inside trusted message content.
///
/// Implementations must keep every piece of existing markup intact and only
/// wrap plain-text matches.
pub trait AlertWordHighlighter: Send + Sync {
    fn highlight(
        &self,
        content: &SafeHtml,
        message_id: u64,
        alert_words: &[String],
        flags: &FlagsState,
    ) -> SafeHtml;
}

/// Renders the small badges shown under a message (starred, edited).
pub trait TagRenderer: Send + Sync {
    fn tags(&self, starred: bool, time_edited: Option<i64>) -> SafeHtml;
}

/// Renders the grouped reaction pills of a message.
pub trait ReactionRenderer: Send + Sync {
    fn reactions(
        &self,
        reactions: &[Reaction],
        message_id: u64,
        own_email: &str,
        realm_emoji: &RealmEmojiTable,
    ) -> SafeHtml;
}

/// The full set of collaborators used by a
/// [`MessageRenderer`](super::renderer::MessageRenderer).
pub struct Collaborators {
    pub time: Box<dyn TimeFormatter>,
    pub highlighter: Box<dyn AlertWordHighlighter>,
    pub tags: Box<dyn TagRenderer>,
    pub reactions: Box<dyn ReactionRenderer>,
}

impl Collaborators {
    /// Replace the time formatter, keeping the other collaborators.
    pub fn with_time(mut self, time: impl TimeFormatter + 'static) -> Self {
        self.time = Box::new(time);
        self
    }

    pub fn with_highlighter(mut self, highlighter: impl AlertWordHighlighter + 'static) -> Self {
        self.highlighter = Box::new(highlighter);
        self
    }

    pub fn with_tags(mut self, tags: impl TagRenderer + 'static) -> Self {
        self.tags = Box::new(tags);
        self
    }

    pub fn with_reactions(mut self, reactions: impl ReactionRenderer + 'static) -> Self {
        self.reactions = Box::new(reactions);
        self
    }
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            time: Box::new(ShortTime::utc()),
            highlighter: Box::new(AlertWordMarker),
            tags: Box::new(MessageTags),
            reactions: Box::new(ReactionList),
        }
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
