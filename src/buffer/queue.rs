//! Unbounded ingestion queue between host producers and the aggregator.
//!
//! Producers hold cloneable [`LineSubmitter`]s; the single consumer owns the
//! [`IngestionQueue`]. Admission never waits: the only way a line is refused is
//! that shutdown has begun.

use crate::reliability::PipelineStats;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError};
use tokio_util::sync::CancellationToken;
use tracing::trace;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Pipeline is shutting down")]
    ShuttingDown,
    #[error("Ingestion queue is closed")]
    Closed,
}

/// Host-side subscription boundary: the integration layer calls `on_line` for
/// every line the host emits.
pub trait LineSubscriber: Send + Sync {
    fn on_line(&self, line: &str);
}

#[derive(Debug, Clone)]
pub struct LineSubmitter {
    tx: UnboundedSender<String>,
    closing: CancellationToken,
    stats: Arc<PipelineStats>,
}

impl LineSubmitter {
    pub fn try_submit(&self, line: impl Into<String>) -> Result<(), SubmitError> {
        if self.closing.is_cancelled() {
            self.stats.record_line_dropped();
            return Err(SubmitError::ShuttingDown);
        }

        if self.tx.send(line.into()).is_err() {
            self.stats.record_line_dropped();
            return Err(SubmitError::Closed);
        }

        self.stats.record_line_submitted();
        Ok(())
    }

    /// Fire-and-forget submission; refused lines are discarded.
    pub fn submit(&self, line: impl Into<String>) {
        if let Err(e) = self.try_submit(line) {
            trace!("Discarding line: {e}");
        }
    }

    pub fn is_closing(&self) -> bool {
        self.closing.is_cancelled()
    }
}

impl LineSubscriber for LineSubmitter {
    fn on_line(&self, line: &str) {
        self.submit(line);
    }
}

/// Result of one bounded wait on the queue.
#[derive(Debug, PartialEq, Eq)]
pub enum QueuePoll {
    Line(String),
    TimedOut,
    /// Every submitter is gone or the queue was closed and drained.
    Disconnected,
}

#[derive(Debug)]
pub struct IngestionQueue {
    rx: UnboundedReceiver<String>,
}

impl IngestionQueue {
    /// Creates the queue and its first submitter. Submissions are refused once
    /// `closing` is cancelled.
    pub fn new(closing: CancellationToken, stats: Arc<PipelineStats>) -> (LineSubmitter, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        let submitter = LineSubmitter { tx, closing, stats };
        (submitter, Self { rx })
    }

    pub async fn poll(&mut self, timeout: Duration) -> QueuePoll {
        match tokio::time::timeout(timeout, self.rx.recv()).await {
            Ok(Some(line)) => QueuePoll::Line(line),
            Ok(None) => QueuePoll::Disconnected,
            Err(_) => QueuePoll::TimedOut,
        }
    }

    pub fn try_next(&mut self) -> Option<String> {
        match self.rx.try_recv() {
            Ok(line) => Some(line),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Stops admission at the channel level; already queued lines stay readable.
    pub fn close(&mut self) {
        self.rx.close();
    }
}
