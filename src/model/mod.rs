pub mod types;

pub use types::{
    FlagsState, MessageRenderData, Narrow, NarrowElement, Reaction, ReactionType, ReactionUser,
    RealmEmoji, RealmEmojiTable, RenderContext, Subscription,
};
