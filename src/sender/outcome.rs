use std::time::Duration;

/// Result of sending one batch. Never persisted; failed batches are gone once
/// the dispatch worker has acted on the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered,
    /// HTTP 429. `retry_after` is the sink's hint, when it sent one.
    RateLimited { retry_after: Option<Duration> },
    /// Dispatch refused locally, e.g. the webhook target is misconfigured.
    Rejected(String),
    /// Network failure or any status other than 200/204/429.
    TransportError(String),
}

impl DispatchOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DispatchOutcome::Delivered)
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, DispatchOutcome::RateLimited { .. })
    }
}
