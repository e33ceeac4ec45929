// Named pattern tables for line classification and body cleanup. Each table
// compiles on first use; a bad pattern surfaces as a RegexError and the
// caller falls back to its default rule.
use super::regex_error::RegexError;
use regex::Regex;
use std::sync::OnceLock;

/// `(name, pattern)` pairs compiled together the first time any is needed.
pub struct PatternTable {
    entries: &'static [(&'static str, &'static str)],
    compiled: OnceLock<Result<Vec<Regex>, RegexError>>,
}

impl PatternTable {
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self {
            entries,
            compiled: OnceLock::new(),
        }
    }

    fn compiled(&self) -> Result<&[Regex], RegexError> {
        let compiled = self.compiled.get_or_init(|| {
            self.entries
                .iter()
                .map(|(name, pattern)| {
                    Regex::new(pattern).map_err(|source| RegexError::CompilationFailed {
                        pattern: pattern.to_string(),
                        name: name.to_string(),
                        source,
                    })
                })
                .collect()
        });

        compiled.as_deref().map_err(|e| e.clone())
    }

    pub fn regex(&self, name: &str) -> Result<&Regex, RegexError> {
        let position = self
            .entries
            .iter()
            .position(|(entry, _)| *entry == name)
            .ok_or_else(|| RegexError::PatternNotFound {
                name: name.to_string(),
            })?;

        // Entries and compiled regexes share indices.
        self.compiled()?
            .get(position)
            .ok_or_else(|| RegexError::PatternNotFound {
                name: name.to_string(),
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }
}

pub const FORMATTED_LINE: &str = "formatted_line";
pub const DOUBLE_SEPARATOR: &str = "double_separator";
pub const SINGLE_SEPARATOR: &str = "single_separator";
pub const BRACKET_MARKER: &str = "bracket_marker";

/// Shapes recognised by the classifier, in priority order.
pub static CLASSIFIER_PATTERNS: PatternTable = PatternTable::new(&[
    (
        FORMATTED_LINE,
        r"(?s)^\[(\d{2}-\d{2}-\d{4} \d{2}:\d{2}:\d{2})\] (TRACE|DEBUG|INFO|WARN|ERROR) > (.*)$",
    ),
    (DOUBLE_SEPARATOR, r"(?s)^\s*(\w+)[^>]*>[^>]*>\s*(.*)$"),
    (SINGLE_SEPARATOR, r"(?s)^\s*(\w+)[^>]*>\s*(.*)$"),
    (BRACKET_MARKER, r"(?s)^\[(.)\]\s+(.*)$"),
]);

pub const ARROW_PREFIX: &str = "arrow_prefix";
pub const SEPARATOR_RUN: &str = "separator_run";

/// Patterns used by body cleanup.
pub static BODY_PATTERNS: PatternTable = PatternTable::new(&[
    (ARROW_PREFIX, r"^\[[^\]]*\]\s*>\s*"),
    (SEPARATOR_RUN, r"\s*>(?:\s*>)*\s*"),
]);
