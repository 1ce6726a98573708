//! Render inputs: the per-view context and the per-message record.

use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::html::SafeHtml;

/// Per-message boolean flags, keyed first by flag name and then by message id.
///
/// Flag names keep their declaration order: the order they were first seen in
/// the source document, or first inserted with [`FlagsState::set`]. A missing
/// flag or a missing id reads as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagsState {
    flags: Vec<(String, HashMap<u64, bool>)>,
}

impl FlagsState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `flag` for message `id`, appending the flag name if it is new.
    pub fn set(&mut self, flag: &str, id: u64, value: bool) {
        match self.flags.iter_mut().find(|(name, _)| name == flag) {
            Some((_, ids)) => {
                ids.insert(id, value);
            }
            None => {
                self.flags
                    .push((flag.to_string(), HashMap::from([(id, value)])));
            }
        }
    }

    /// Builder form of [`FlagsState::set`].
    pub fn with(mut self, flag: &str, id: u64, value: bool) -> Self {
        self.set(flag, id, value);
        self
    }

    pub fn is_set(&self, flag: &str, id: u64) -> bool {
        self.flags
            .iter()
            .find(|(name, _)| name == flag)
            .and_then(|(_, ids)| ids.get(&id).copied())
            .unwrap_or(false)
    }

    /// Flag names with their id tables, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HashMap<u64, bool>)> {
        self.flags.iter().map(|(name, ids)| (name.as_str(), ids))
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl<'de> Deserialize<'de> for FlagsState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FlagsVisitor;

        impl<'de> Visitor<'de> for FlagsVisitor {
            type Value = FlagsState;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of flag name to a map of message id to bool")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut state = FlagsState::new();
                while let Some((name, ids)) = map.next_entry::<String, HashMap<u64, bool>>()? {
                    // A repeated name merges into the first occurrence's slot.
                    for (id, value) in ids {
                        state.set(&name, id, value);
                    }
                    if !state.flags.iter().any(|(existing, _)| *existing == name) {
                        state.flags.push((name, HashMap::new()));
                    }
                }
                Ok(state)
            }
        }

        deserializer.deserialize_map(FlagsVisitor)
    }
}

/// A custom emoji defined for the current realm.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RealmEmoji {
    pub name: String,
    pub source_url: String,
    #[serde(default)]
    pub deactivated: bool,
}

/// Realm emoji keyed by emoji id (the `emoji_code` of realm reactions).
pub type RealmEmojiTable = HashMap<String, RealmEmoji>;

/// Which emoji namespace a reaction's `emoji_code` belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionType {
    UnicodeEmoji,
    RealmEmoji,
    ZulipExtraEmoji,
}

impl ReactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionType::UnicodeEmoji => "unicode_emoji",
            ReactionType::RealmEmoji => "realm_emoji",
            ReactionType::ZulipExtraEmoji => "zulip_extra_emoji",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReactionUser {
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub user_id: u64,
}

/// One user's emoji reaction to a message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Reaction {
    pub emoji_name: String,
    pub emoji_code: String,
    pub reaction_type: ReactionType,
    pub user: ReactionUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Subscription {
    pub stream_id: u64,
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default = "default_in_home_view")]
    pub in_home_view: bool,
}

fn default_in_home_view() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NarrowElement {
    pub operator: String,
    pub operand: String,
}

/// The view filter currently applied to the message list.
pub type Narrow = Vec<NarrowElement>;

/// Data used in rendering every message of the current view.
///
/// Built upstream and only ever read by the renderer. See also
/// [`MessageRenderData`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderContext {
    pub alert_words: Vec<String>,
    pub flags: FlagsState,
    pub own_email: String,
    pub realm_emoji: RealmEmojiTable,
    pub twenty_four_hour_time: bool,
    pub subscriptions: Vec<Subscription>,
    pub narrow: Narrow,
}

/// Data used in rendering one specific message.
///
/// `content` arrives already sanitized by the upstream pipeline and is the only
/// field inserted without escaping. `from_name`, `from_email` and `avatar_url`
/// are untrusted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRenderData {
    pub content: SafeHtml,
    pub id: u64,
    #[serde(default)]
    pub is_outbox: bool,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    #[serde(default)]
    pub time_edited: Option<i64>,
    pub from_name: String,
    pub from_email: String,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    pub avatar_url: String,
    #[serde(default)]
    pub is_brief: bool,
}
