pub mod outcome;
pub mod webhook;

pub use outcome::DispatchOutcome;
pub use webhook::{BatchSink, ClientConfig, DispatchError, WebhookDispatcher, WebhookTarget};
