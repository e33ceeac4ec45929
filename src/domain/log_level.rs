use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity assigned to a host log line by the classifier.
///
/// This is distinct from the config `LogLevel` (used for configuring the
/// forwarder's own tracing output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    /// Maps the leading token of a structured log line to a level.
    ///
    /// Only the explicit severities are recognised; `INFO` and anything else
    /// yields `None` so the caller can look for an inline prefix instead.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "TRACE" => Some(LogLevel::Trace),
            "DEBUG" => Some(LogLevel::Debug),
            "WARN" | "WARNING" => Some(LogLevel::Warn),
            "ERROR" => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// Level selected by a single-character bracket marker such as `[!]`.
    pub fn from_marker(marker: char) -> Self {
        match marker {
            '!' => LogLevel::Error,
            '?' => LogLevel::Warn,
            _ => LogLevel::Info,
        }
    }

    /// Parses the exact rendered tag (`INFO`, `WARN`, ...).
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.as_str() == tag)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_mapping() {
        assert_eq!(LogLevel::from_token("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::from_token("warn"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_token("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_token("Error"), Some(LogLevel::Error));
        assert_eq!(LogLevel::from_token("TRACE"), Some(LogLevel::Trace));
        assert_eq!(LogLevel::from_token("LOG"), None);
        assert_eq!(LogLevel::from_token("INFO"), None);
    }

    #[test]
    fn test_marker_mapping() {
        assert_eq!(LogLevel::from_marker('!'), LogLevel::Error);
        assert_eq!(LogLevel::from_marker('?'), LogLevel::Warn);
        assert_eq!(LogLevel::from_marker('i'), LogLevel::Info);
    }

    #[test]
    fn test_tag_round_trip() {
        for level in LogLevel::ALL {
            assert_eq!(LogLevel::from_tag(level.as_str()), Some(level));
        }
        assert_eq!(LogLevel::from_tag("info"), None);
    }
}
