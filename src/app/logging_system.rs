use super::config::LogLevel;
use crate::domain::ForwarderError;
use parking_lot::RwLock;
use std::sync::OnceLock;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// One `target=level` entry of the tracing filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogDirective {
    target: String,
    level: LogLevel,
}

impl LogDirective {
    pub fn new(target: impl Into<String>, level: LogLevel) -> Self {
        Self {
            target: target.into(),
            level,
        }
    }

    pub fn parse(directive: &str) -> Result<Self, ForwarderError> {
        let (target, level) = directive.split_once('=').ok_or_else(|| {
            ForwarderError::Logging(format!("Directive '{directive}' is not target=level"))
        })?;

        if target.trim().is_empty() {
            return Err(ForwarderError::Logging(format!(
                "Directive '{directive}' has an empty target"
            )));
        }

        let level = level
            .parse::<LogLevel>()
            .map_err(|e| ForwarderError::Logging(e.to_string()))?;
        Ok(Self::new(target.trim(), level))
    }

    pub fn to_filter_string(&self) -> String {
        format!("{}={}", self.target, self.level.as_str())
    }
}

pub struct LoggingSystem {
    directives: RwLock<Vec<LogDirective>>,
}

impl LoggingSystem {
    pub fn new() -> Self {
        Self {
            directives: RwLock::new(Vec::new()),
        }
    }

    /// Malformed directives are skipped with a warning on stderr, since
    /// tracing is not up yet.
    pub fn add_directive(&self, directive: &str) {
        match LogDirective::parse(directive) {
            Ok(directive) => self.directives.write().push(directive),
            Err(e) => eprintln!("Warning: {e}, skipping directive"),
        }
    }

    /// HTTP stack crates are chatty at debug; keep them at warn.
    pub fn add_default_directives(&self) {
        let mut directives = self.directives.write();
        for target in ["hyper", "hyper_util", "reqwest", "h2", "rustls"] {
            directives.push(LogDirective::new(target, LogLevel::Warn));
        }
    }

    pub fn build_filter_string(&self, default_level: LogLevel) -> String {
        let directives = self.directives.read();

        let mut filter_parts = Vec::with_capacity(directives.len() + 1);
        filter_parts.push(default_level.as_str().to_string());
        filter_parts.extend(directives.iter().map(LogDirective::to_filter_string));

        filter_parts.join(",")
    }

    pub fn initialize_tracing(
        &self,
        default_level: LogLevel,
        json: bool,
    ) -> Result<(), ForwarderError> {
        let filter_string = self.build_filter_string(default_level);
        let env_filter = EnvFilter::try_new(&filter_string).map_err(|e| {
            ForwarderError::Logging(format!("Failed to create EnvFilter with '{filter_string}': {e}"))
        })?;

        let registry = tracing_subscriber::registry().with(env_filter);
        let result = if json {
            registry
                .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
                .try_init()
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr)
                        .compact(),
                )
                .try_init()
        };

        result.map_err(|e| {
            ForwarderError::Logging(format!("Failed to set global tracing subscriber: {e}"))
        })
    }

    pub fn directive_count(&self) -> usize {
        self.directives.read().len()
    }
}

impl Default for LoggingSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Installs the global subscriber once. Later calls return the first outcome.
pub fn setup_logging(level: LogLevel, json: bool) -> Result<(), ForwarderError> {
    static INIT_RESULT: OnceLock<Result<(), String>> = OnceLock::new();

    let result = INIT_RESULT.get_or_init(|| {
        let logging_system = LoggingSystem::new();
        logging_system.add_default_directives();
        if let Ok(extra) = std::env::var("FORWARDER_LOG_DIRECTIVES") {
            for directive in extra.split(',').filter(|d| !d.trim().is_empty()) {
                logging_system.add_directive(directive);
            }
        }

        logging_system
            .initialize_tracing(level, json)
            .map_err(|e| e.to_string())
    });

    result.clone().map_err(ForwarderError::Logging)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_parsing() {
        let directive = LogDirective::parse("reqwest=debug").unwrap();
        assert_eq!(directive.to_filter_string(), "reqwest=debug");

        assert!(LogDirective::parse("reqwest").is_err());
        assert!(LogDirective::parse("=debug").is_err());
        assert!(LogDirective::parse("reqwest=loud").is_err());
    }

    #[test]
    fn test_invalid_directive_is_skipped() {
        let system = LoggingSystem::new();
        system.add_directive("nonsense");
        system.add_directive("webhook_log_forwarder=trace");
        assert_eq!(system.directive_count(), 1);
    }

    #[test]
    fn test_build_filter_string() {
        let system = LoggingSystem::new();
        assert_eq!(system.build_filter_string(LogLevel::Info), "info");

        system.add_default_directives();
        let filter = system.build_filter_string(LogLevel::Debug);
        assert!(filter.starts_with("debug,"));
        assert!(filter.contains("hyper=warn"));
        assert!(filter.contains("reqwest=warn"));
        assert!(filter.contains("h2=warn"));
    }

    #[test]
    fn test_setup_logging_is_idempotent() {
        let first = setup_logging(LogLevel::Warn, false);
        let second = setup_logging(LogLevel::Trace, true);
        assert_eq!(first.is_ok(), second.is_ok());
    }
}
