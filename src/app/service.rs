use super::Config;
use super::pipeline::{
    AggregatorParams, DispatchWorkerParams, run_aggregator, run_dispatch_worker,
};
use crate::{
    buffer::{IngestionQueue, LineSubmitter},
    domain::ForwarderError,
    parser::{LineClassifier, LineFormatter},
    reliability::{PipelineStats, RetryPolicy, StatsSnapshot},
    sender::{BatchSink, WebhookDispatcher},
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Both tasks finished inside the grace period.
    Drained,
    /// The grace period ran out; whatever was still queued or in flight is gone.
    TimedOut,
    AlreadyStopped,
}

struct PipelineTasks {
    aggregator: JoinHandle<()>,
    dispatcher: JoinHandle<()>,
}

/// A running ingestion pipeline: one aggregator task feeding one dispatch
/// worker. Dropping it cancels both without waiting.
pub struct Pipeline {
    submitter: LineSubmitter,
    stats: Arc<PipelineStats>,
    cancel: CancellationToken,
    shutdown_grace: Duration,
    tasks: Mutex<Option<PipelineTasks>>,
}

impl Pipeline {
    /// Spawns the aggregator and the dispatch worker on the current runtime.
    pub fn start<S: BatchSink>(config: &Config, sink: S) -> Self {
        let cancel = CancellationToken::new();
        let stats = Arc::new(PipelineStats::new());
        let (submitter, queue) = IngestionQueue::new(cancel.clone(), stats.clone());
        let (batch_tx, batch_rx) = mpsc::channel(config.dispatch_queue_capacity.max(1));

        let aggregator = tokio::spawn(run_aggregator(AggregatorParams {
            queue,
            batch_tx,
            classifier: LineClassifier::new(),
            formatter: LineFormatter::new(config.max_message_length),
            window: config.rate_limit_interval,
            poll_interval: config.poll_interval,
            cancel: cancel.clone(),
            stats: stats.clone(),
        }));

        let dispatcher = tokio::spawn(run_dispatch_worker(DispatchWorkerParams {
            sink,
            batch_rx,
            retry_policy: RetryPolicy::new(config.retry_config()),
            cancel: cancel.clone(),
            stats: stats.clone(),
        }));

        info!("Pipeline started");

        Self {
            submitter,
            stats,
            cancel,
            shutdown_grace: config.shutdown_grace,
            tasks: Mutex::new(Some(PipelineTasks {
                aggregator,
                dispatcher,
            })),
        }
    }

    /// Starts a pipeline that posts to the webhook described by `config`.
    pub fn with_webhook(config: &Config) -> Result<Self, ForwarderError> {
        let dispatcher = WebhookDispatcher::new(config.webhook_target(), config.client_config())?;
        Ok(Self::start(config, dispatcher))
    }

    pub fn submitter(&self) -> LineSubmitter {
        self.submitter.clone()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Live counters that outlive the pipeline handle.
    pub fn stats_handle(&self) -> Arc<PipelineStats> {
        Arc::clone(&self.stats)
    }

    pub fn is_running(&self) -> bool {
        self.tasks.lock().is_some()
    }

    /// Stops admission, drains what is queued and waits for the dispatch
    /// worker, all within the configured grace period.
    pub async fn shutdown(&self) -> ShutdownOutcome {
        let Some(tasks) = self.tasks.lock().take() else {
            return ShutdownOutcome::AlreadyStopped;
        };

        info!("Initiating pipeline shutdown (grace {:?})", self.shutdown_grace);
        self.cancel.cancel();

        let PipelineTasks {
            mut aggregator,
            mut dispatcher,
        } = tasks;

        let drained = tokio::time::timeout(self.shutdown_grace, async {
            let _ = (&mut aggregator).await;
            let _ = (&mut dispatcher).await;
        })
        .await
        .is_ok();

        if drained {
            info!("Pipeline drained");
            ShutdownOutcome::Drained
        } else {
            aggregator.abort();
            dispatcher.abort();
            warn!("Shutdown grace period exceeded, abandoning pending batches");
            ShutdownOutcome::TimedOut
        }
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("running", &self.is_running())
            .field("shutdown_grace", &self.shutdown_grace)
            .finish()
    }
}
