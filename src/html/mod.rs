//! Safe HTML rendering of single chat messages.
//!
//! # Architecture
//!
//! ```text
//! html/
//! ├── mod.rs           # Module facade (this file)
//! ├── template.rs      # SafeHtml + escape-by-default HtmlBuilder
//! ├── renderer.rs      # Message record -> HTML fragment
//! ├── collab.rs        # Collaborator traits
//! ├── alert_words.rs   # Default alert-word highlighter
//! ├── tags.rs          # Default starred/edited badges
//! ├── reactions.rs     # Default reaction pills
//! └── time.rs          # Default short time labels
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use message_html::html::render_message;
//!
//! let fragment = render_message(&context, &message);
//! ```

mod alert_words;
mod collab;
mod reactions;
mod renderer;
mod tags;
mod template;
mod time;

pub use alert_words::{AlertWordMarker, HAS_ALERT_WORD_FLAG};
pub use collab::{AlertWordHighlighter, Collaborators, ReactionRenderer, TagRenderer, TimeFormatter};
pub use reactions::ReactionList;
pub use renderer::{
    MessageRenderer, MessageVariant, OUTBOX_SPINNER, STARRED_FLAG, flag_names, message_body,
    message_div, message_subheader, render_message,
};
pub use tags::MessageTags;
pub use template::{HtmlBuilder, SafeHtml, html_escape};
pub use time::ShortTime;
