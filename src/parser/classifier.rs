//! Rule-based classification of raw host lines.
//!
//! Rules are evaluated in priority order; the first one whose shape matches
//! supplies the level and payload. When none match, the whole line becomes the
//! payload at `INFO`. A leading `[X] ` marker then overrides the level, and the
//! payload goes through body cleanup. Lines that clean up to nothing are
//! rejected.

use super::formatter::clean_body;
use super::regex_error::{FallbackStrategy, RegexError};
use super::regex_patterns::{
    BRACKET_MARKER, CLASSIFIER_PATTERNS, DOUBLE_SEPARATOR, FORMATTED_LINE, SINGLE_SEPARATOR,
};
use crate::domain::{LogLevel, LogRecord};
use tracing::{debug, warn};

/// Levels that may be spelled inline at the start of a payload, e.g. `WARN: ...`.
const INLINE_LEVELS: [LogLevel; 4] = [
    LogLevel::Debug,
    LogLevel::Warn,
    LogLevel::Error,
    LogLevel::Trace,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationRule {
    /// A line this crate already rendered; level and body are kept as-is.
    FormattedLine,
    /// `token ... > ... > payload`
    DoubleSeparator,
    /// `token ... > payload`
    SingleSeparator,
}

impl ClassificationRule {
    pub const ORDERED: [ClassificationRule; 3] = [
        ClassificationRule::FormattedLine,
        ClassificationRule::DoubleSeparator,
        ClassificationRule::SingleSeparator,
    ];

    pub fn pattern_name(self) -> &'static str {
        match self {
            ClassificationRule::FormattedLine => FORMATTED_LINE,
            ClassificationRule::DoubleSeparator => DOUBLE_SEPARATOR,
            ClassificationRule::SingleSeparator => SINGLE_SEPARATOR,
        }
    }

    /// Returns `Ok(None)` when the line does not have this rule's shape.
    pub fn extract(self, raw: &str) -> Result<Option<Extraction>, RegexError> {
        let regex = CLASSIFIER_PATTERNS.regex(self.pattern_name())?;
        let Some(captures) = regex.captures(raw) else {
            return Ok(None);
        };

        let extraction = match self {
            ClassificationRule::FormattedLine => Extraction {
                level: LogLevel::from_tag(&captures[2]).unwrap_or_default(),
                payload: captures[3].to_string(),
                rule: Some(self),
            },
            ClassificationRule::DoubleSeparator | ClassificationRule::SingleSeparator => {
                let (level, payload) = resolve_token_level(&captures[1], &captures[2]);
                Extraction {
                    level,
                    payload,
                    rule: Some(self),
                }
            }
        };

        Ok(Some(extraction))
    }
}

/// Level and payload pulled out of a raw line, before marker handling and cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub level: LogLevel,
    pub payload: String,
    /// `None` when the default rule applied.
    pub rule: Option<ClassificationRule>,
}

impl Extraction {
    fn whole_line(raw: &str) -> Self {
        Self {
            level: LogLevel::Info,
            payload: raw.to_string(),
            rule: None,
        }
    }
}

fn resolve_token_level(token: &str, payload: &str) -> (LogLevel, String) {
    if let Some(level) = LogLevel::from_token(token) {
        return (level, payload.to_string());
    }

    for level in INLINE_LEVELS {
        if let Some(rest) = payload
            .strip_prefix(level.as_str())
            .and_then(|rest| rest.strip_prefix(':'))
        {
            return (level, rest.trim_start().to_string());
        }
    }

    (LogLevel::Info, payload.to_string())
}

/// Applies a leading `[X] ` marker, which forces the level and is stripped.
fn apply_bracket_marker(level: LogLevel, payload: String) -> (LogLevel, String) {
    let regex = match CLASSIFIER_PATTERNS.regex(BRACKET_MARKER) {
        Ok(regex) => regex,
        Err(e) => {
            debug!("Bracket marker detection unavailable: {e}");
            return (level, payload);
        }
    };

    match regex.captures(&payload) {
        Some(captures) => {
            let marker = captures[1].chars().next().unwrap_or(' ');
            (LogLevel::from_marker(marker), captures[2].to_string())
        }
        None => (level, payload),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LineClassifier;

impl LineClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classifies one raw line, or returns `None` if it carries no content.
    pub fn classify(&self, raw: &str) -> Option<LogRecord> {
        let extraction = self.extract(raw);
        let (level, payload) = apply_bracket_marker(extraction.level, extraction.payload);

        // Nothing was actually pulled out of the line: clean the original instead.
        let source = if payload.len() == raw.len() {
            raw
        } else {
            payload.as_str()
        };

        let body = clean_body(source);
        if body.is_empty() {
            return None;
        }

        Some(LogRecord::new(level, body))
    }

    pub fn extract(&self, raw: &str) -> Extraction {
        for rule in ClassificationRule::ORDERED {
            match rule.extract(raw) {
                Ok(Some(extraction)) => return extraction,
                Ok(None) => continue,
                Err(e) => match e.fallback_strategy() {
                    FallbackStrategy::SkipRule => {
                        debug!("Skipping rule {:?}: {e}", rule);
                        continue;
                    }
                    FallbackStrategy::UseDefaultRule => {
                        warn!("Classifier patterns unavailable, using default rule: {e}");
                        break;
                    }
                },
            }
        }

        Extraction::whole_line(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(raw: &str) -> Option<LogRecord> {
        LineClassifier::new().classify(raw)
    }

    #[test]
    fn test_default_token_is_info() {
        let record = classify("Server > > Player connected").unwrap();
        assert_eq!(record.level, LogLevel::Info);
        assert_eq!(record.body, "Player connected");
    }

    #[test]
    fn test_token_selects_level() {
        let record = classify("DEBUG Something > > verbose detail").unwrap();
        assert_eq!(record.level, LogLevel::Debug);
        assert_eq!(record.body, "Verbose detail");
    }

    #[test]
    fn test_bracket_markers() {
        let record = classify("[!] disk full").unwrap();
        assert_eq!(record, LogRecord::new(LogLevel::Error, "Disk full"));

        let record = classify("[?] low memory").unwrap();
        assert_eq!(record, LogRecord::new(LogLevel::Warn, "Low memory"));

        let record = classify("[i] note this").unwrap();
        assert_eq!(record, LogRecord::new(LogLevel::Info, "Note this"));
    }

    #[test]
    fn test_inline_prefix_overrides_default_token() {
        let record = classify("LOG  : General , 1697040000000> 0> WARN: chunk save slow").unwrap();
        assert_eq!(record.level, LogLevel::Warn);
        assert_eq!(record.body, "Chunk save slow");
    }

    #[test]
    fn test_single_separator_fallback() {
        let extraction = LineClassifier::new().extract("ERROR net> socket closed");
        assert_eq!(extraction.rule, Some(ClassificationRule::SingleSeparator));
        assert_eq!(extraction.level, LogLevel::Error);
        assert_eq!(extraction.payload, "socket closed");
    }

    #[test]
    fn test_unmatched_line_uses_whole_line() {
        let extraction = LineClassifier::new().extract("plain text line");
        assert_eq!(extraction.rule, None);

        let record = classify("plain text line").unwrap();
        assert_eq!(record, LogRecord::new(LogLevel::Info, "Plain text line"));
    }

    #[test]
    fn test_empty_lines_are_rejected() {
        assert!(classify("").is_none());
        assert!(classify("   ").is_none());
        assert!(classify("Server > > ").is_none());
        assert!(classify("[!] 123").is_none());
    }

    #[test]
    fn test_formatted_line_keeps_level_and_body() {
        let record = classify("[07-03-2024 09:05:01] WARN > Low memory").unwrap();
        assert_eq!(record, LogRecord::new(LogLevel::Warn, "Low memory"));
    }
}
