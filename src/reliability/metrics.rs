// Lock-free pipeline statistics using atomic operations

use crate::sender::DispatchOutcome;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by producers, the aggregator and the dispatch worker.
#[derive(Debug, Default)]
pub struct PipelineStats {
    lines_submitted: AtomicU64,
    lines_dropped: AtomicU64,
    lines_rejected: AtomicU64,
    batches_sealed: AtomicU64,
    delivered: AtomicU64,
    rate_limited: AtomicU64,
    rejected: AtomicU64,
    transport_errors: AtomicU64,
    retries: AtomicU64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub lines_submitted: u64,
    pub lines_dropped: u64,
    pub lines_rejected: u64,
    pub batches_sealed: u64,
    pub delivered: u64,
    pub rate_limited: u64,
    pub rejected: u64,
    pub transport_errors: u64,
    pub retries: u64,
}

impl StatsSnapshot {
    /// Total dispatch attempts, retries included.
    pub fn dispatch_attempts(&self) -> u64 {
        self.delivered + self.rate_limited + self.rejected + self.transport_errors
    }
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_line_submitted(&self) {
        self.lines_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_line_dropped(&self) {
        self.lines_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_line_rejected(&self) {
        self.lines_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_batches_sealed(&self, count: usize) {
        self.batches_sealed
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_outcome(&self, outcome: &DispatchOutcome) {
        let counter = match outcome {
            DispatchOutcome::Delivered => &self.delivered,
            DispatchOutcome::RateLimited { .. } => &self.rate_limited,
            DispatchOutcome::Rejected(_) => &self.rejected,
            DispatchOutcome::TransportError(_) => &self.transport_errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            lines_submitted: self.lines_submitted.load(Ordering::Relaxed),
            lines_dropped: self.lines_dropped.load(Ordering::Relaxed),
            lines_rejected: self.lines_rejected.load(Ordering::Relaxed),
            batches_sealed: self.batches_sealed.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
        }
    }
}
