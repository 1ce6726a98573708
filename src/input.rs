//! JSON input documents for the `msghtml render` command.
//!
//! ```json
//! {
//!   "context": {
//!     "alertWords": ["deploy"],
//!     "flags": { "starred": { "42": true }, "has_alert_word": { "42": true } },
//!     "ownEmail": "me@example.com",
//!     "realmEmoji": {},
//!     "twentyFourHourTime": false,
//!     "subscriptions": [],
//!     "narrow": []
//!   },
//!   "message": {
//!     "content": "<p>deploy is done</p>",
//!     "id": 42,
//!     "isOutbox": false,
//!     "reactions": [],
//!     "timeEdited": null,
//!     "fromName": "Ada",
//!     "fromEmail": "ada@example.com",
//!     "timestamp": 1500000000,
//!     "avatarUrl": "https://example.com/ada.png",
//!     "isBrief": false
//!   }
//! }
//! ```

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::html::ShortTime;
use crate::model::{MessageRenderData, RenderContext};

/// Errors that can occur when loading or validating an input document.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to read input: {0}")]
    ReadFile(#[from] std::io::Error),

    #[error("Failed to parse input JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// One message together with the context it is rendered in.
#[derive(Debug, Clone, Deserialize)]
pub struct InputDocument {
    pub context: RenderContext,
    pub message: MessageRenderData,
}

impl InputDocument {
    /// Load a document from a file path.
    ///
    /// If path is "-", reads from stdin.
    pub fn load(path: &Path) -> Result<Self, InputError> {
        if path.as_os_str() == "-" {
            return Self::from_reader(std::io::stdin().lock());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load a document from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, InputError> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Check the parts serde cannot: timestamps must be representable.
    pub fn validate(&self) -> Result<(), InputError> {
        let mut errors = Vec::new();
        let message = &self.message;

        if DateTime::<Utc>::from_timestamp(message.timestamp, 0).is_none() {
            errors.push(format!(
                "message.timestamp {} is out of range",
                message.timestamp
            ));
        }
        if let Some(edited) = message.time_edited
            && DateTime::<Utc>::from_timestamp(edited, 0).is_none()
        {
            errors.push(format!("message.timeEdited {edited} is out of range"));
        }

        if self.context.own_email.is_empty() && !message.reactions.is_empty() {
            warn!(
                component = "input",
                operation = "validate",
                message_id = message.id,
                "context.ownEmail is empty; no reaction will be marked as the viewer's"
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(InputError::Validation(errors.join("; ")))
        }
    }
}

/// Time formatter for a UTC offset given in minutes.
pub fn time_formatter(utc_offset_minutes: i32) -> Result<ShortTime, InputError> {
    ShortTime::from_offset_minutes(utc_offset_minutes).ok_or_else(|| {
        InputError::Validation(format!(
            "UTC offset {utc_offset_minutes} minutes must lie strictly within one day"
        ))
    })
}
