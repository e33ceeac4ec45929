//! Domain layer for webhook-log-forwarder.
//!
//! Contains the canonical types shared across all modules:
//! - `LogRecord`: A classified line (level + body)
//! - `LogLevel`: Severity resolved by the classifier (Trace/Debug/Info/Warn/Error)
//! - `ForwarderError`: Top-level error type

pub mod error;
pub mod log_level;
pub mod log_record;

pub use error::ForwarderError;
pub use log_level::LogLevel;
pub use log_record::LogRecord;
