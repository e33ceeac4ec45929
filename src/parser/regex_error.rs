// Errors from the lazily compiled pattern tables
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum RegexError {
    #[error("Regex compilation failed for pattern '{pattern}' (name: {name}): {source}")]
    CompilationFailed {
        pattern: String,
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("Regex pattern not found: {name}")]
    PatternNotFound { name: String },
}

impl RegexError {
    /// Runtime fallback strategy for regex failures
    pub fn fallback_strategy(&self) -> FallbackStrategy {
        match self {
            RegexError::CompilationFailed { .. } => FallbackStrategy::UseDefaultRule,
            RegexError::PatternNotFound { .. } => FallbackStrategy::SkipRule,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackStrategy {
    /// Treat the whole line as payload at the default level.
    UseDefaultRule,
    /// Move on to the next rule in priority order.
    SkipRule,
}
