//! Shared traits and the fixed timestamp wire format.

use std::fmt;

use chrono::{NaiveDateTime, Timelike};

/// Wall-clock timestamp used for entry and exit stamps.
pub type Timestamp = NaiveDateTime;

/// `DD-MM-YYYY HH:MM`, the only accepted timestamp format.
pub const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M";

/// Human readable form of [`TIMESTAMP_FORMAT`] for prompts and errors.
pub const TIMESTAMP_HINT: &str = "DD-MM-YYYY HH:MM";

/// Converts an entity into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Parses a timestamp in the fixed `DD-MM-YYYY HH:MM` format.
pub fn parse_timestamp(input: &str) -> Result<Timestamp, TimestampError> {
    let trimmed = input.trim();
    NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT).map_err(|_| TimestampError {
        input: trimmed.to_string(),
    })
}

/// Formats a timestamp in the fixed `DD-MM-YYYY HH:MM` format.
pub fn format_timestamp(timestamp: &Timestamp) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// `true` when the timestamp survives a format/parse cycle unchanged, i.e.
/// it carries no seconds.
pub fn is_minute_precision(timestamp: &Timestamp) -> bool {
    timestamp.second() == 0 && timestamp.nanosecond() == 0
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampError {
    pub input: String,
}

impl fmt::Display for TimestampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid timestamp `{}` (use {})",
            self.input, TIMESTAMP_HINT
        )
    }
}

impl std::error::Error for TimestampError {}
