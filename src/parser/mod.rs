//! Line classification and formatting.
//!
//! Both stages are pure: the classifier turns a raw host line into a
//! [`LogRecord`](crate::domain::LogRecord) (or rejects it), the formatter renders
//! the record into a display-ready line bounded by the sink's length limit.

pub mod classifier;
pub mod formatter;
pub mod regex_error;
pub mod regex_patterns;

pub use classifier::{ClassificationRule, Extraction, LineClassifier};
pub use formatter::{
    DEFAULT_MAX_MESSAGE_LENGTH, LineFormatter, TIMESTAMP_FORMAT, char_len, clean_body,
    truncate_chars,
};
pub use regex_error::{FallbackStrategy, RegexError};
pub use regex_patterns::PatternTable;

/// Classifies and renders a raw line in one step.
pub fn format_line(
    classifier: &LineClassifier,
    formatter: &LineFormatter,
    raw: &str,
) -> Option<String> {
    classifier
        .classify(raw)
        .map(|record| formatter.render(&record))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line_end_to_end() {
        let classifier = LineClassifier::new();
        let formatter = LineFormatter::default();

        let line = format_line(&classifier, &formatter, "[!] disk full").unwrap();
        assert!(line.starts_with('['));
        assert!(line.ends_with("] ERROR > Disk full"));

        assert!(format_line(&classifier, &formatter, "").is_none());
    }

    #[test]
    fn test_formatting_is_idempotent() {
        let classifier = LineClassifier::new();
        let formatter = LineFormatter::default();

        let once = format_line(&classifier, &formatter, "WARN core > > slow *tick*").unwrap();
        let twice = format_line(&classifier, &formatter, &once).unwrap();

        let body = |line: &str| line.split_once("] ").map(|(_, rest)| rest.to_string());
        assert_eq!(body(&once), Some("WARN > Slow tick".to_string()));
        assert_eq!(body(&once), body(&twice));
    }
}
