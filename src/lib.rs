#![warn(rust_2024_compatibility)]
// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
// Noisy pedantic lints suppressed:
#![allow(
    clippy::cast_lossless,            // Infallible casts are clear enough with `as`
    clippy::cast_possible_truncation, // Durations in millis fit in u64
    clippy::cast_precision_loss,      // Acceptable for jitter
    clippy::missing_errors_doc,       // Internal API
    clippy::missing_panics_doc,       // Internal API
    clippy::module_name_repetitions,  // e.g. CommandError in command module
    clippy::must_use_candidate,       // Annotated selectively on critical APIs
    clippy::doc_markdown              // Internal API
)]

pub mod app;
pub mod buffer;
pub mod command;
pub mod domain;
pub mod parser;
pub mod reliability;
pub mod sender;

pub use app::{App, Config, Pipeline, ShutdownOutcome};
pub use buffer::{LineSubmitter, LineSubscriber, SubmitError};
pub use domain::{ForwarderError, LogLevel, LogRecord};
pub use parser::{LineClassifier, LineFormatter};
pub use sender::{BatchSink, DispatchOutcome, WebhookDispatcher, WebhookTarget};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
