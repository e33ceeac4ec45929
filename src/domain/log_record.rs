use super::log_level::LogLevel;
use serde::{Deserialize, Serialize};

/// A host log line after classification: resolved level plus cleaned body.
///
/// Records are transient; they live only between dequeue and formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub level: LogLevel,
    pub body: String,
}

impl LogRecord {
    pub fn new(level: LogLevel, body: impl Into<String>) -> Self {
        Self {
            level,
            body: body.into(),
        }
    }
}
