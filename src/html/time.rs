//! Short time-of-day labels for message subheaders.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use tracing::warn;

use super::collab::TimeFormatter;

/// Formats `9:05 PM` / `21:05` in a fixed UTC offset.
///
/// The host's local zone is never consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortTime {
    offset: FixedOffset,
}

impl ShortTime {
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    pub fn with_offset(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// `None` when the offset is not strictly within one day of UTC.
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(Self::with_offset)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}

impl Default for ShortTime {
    fn default() -> Self {
        Self::utc()
    }
}

impl TimeFormatter for ShortTime {
    fn short_time(&self, instant_ms: i64, use_24h: bool) -> String {
        let Some(instant) = DateTime::<Utc>::from_timestamp_millis(instant_ms) else {
            warn!(
                component = "time",
                operation = "short_time",
                instant_ms,
                "Timestamp out of range; leaving time label empty"
            );
            return String::new();
        };
        let local = instant.with_timezone(&self.offset);
        let pattern = if use_24h { "%-H:%M" } else { "%-I:%M %p" };
        local.format(pattern).to_string()
    }
}
