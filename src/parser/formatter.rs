//! Body cleanup and line rendering.
//!
//! Every rendered line has the shape `[DD-MM-YYYY HH:MM:SS] LEVEL > body` and is
//! cut to the configured maximum length. Lengths are counted in characters
//! because that is what the chat sink limits on.

use super::regex_patterns::{ARROW_PREFIX, BODY_PATTERNS, SEPARATOR_RUN};
use crate::domain::LogRecord;
use chrono::{Local, NaiveDateTime};
use tracing::debug;

pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 2000;
pub const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// Normalizes a payload before it is rendered.
///
/// Steps, in order: drop a leading `[...] > ` prefix, strip leading digits and
/// whitespace, collapse whitespace-padded `>` runs into `" > "`, capitalize the
/// first character, remove `*` emphasis markers.
pub fn clean_body(text: &str) -> String {
    let without_prefix = match BODY_PATTERNS.regex(ARROW_PREFIX) {
        Ok(regex) => regex.replace(text, "").into_owned(),
        Err(e) => {
            debug!("Skipping prefix removal: {e}");
            text.to_string()
        }
    };

    let stripped =
        without_prefix.trim_start_matches(|c: char| c.is_ascii_digit() || c.is_whitespace());

    let collapsed = match BODY_PATTERNS.regex(SEPARATOR_RUN) {
        Ok(regex) => regex.replace_all(stripped, " > ").into_owned(),
        Err(e) => {
            debug!("Skipping separator collapse: {e}");
            stripped.to_string()
        }
    };

    let capitalized = capitalize_first(collapsed.trim());
    capitalized.replace('*', "").trim().to_string()
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Number of characters in `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Cuts `text` to at most `max_chars` characters without splitting a char.
pub fn truncate_chars(text: &mut String, max_chars: usize) {
    if let Some((idx, _)) = text.char_indices().nth(max_chars) {
        text.truncate(idx);
    }
}

#[derive(Debug, Clone)]
pub struct LineFormatter {
    max_length: usize,
}

impl Default for LineFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGE_LENGTH)
    }
}

impl LineFormatter {
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Renders a record stamped with the current local time.
    pub fn render(&self, record: &LogRecord) -> String {
        self.render_at(record, Local::now().naive_local())
    }

    pub fn render_at(&self, record: &LogRecord, at: NaiveDateTime) -> String {
        let mut line = format!(
            "[{}] {} > {}",
            at.format(TIMESTAMP_FORMAT),
            record.level,
            record.body
        );
        truncate_chars(&mut line, self.max_length);
        line
    }
}
