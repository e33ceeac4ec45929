use crate::{
    buffer::{Batch, BatchPacker, IngestionQueue, QueuePoll, SealReason},
    parser::{LineClassifier, LineFormatter, format_line},
    reliability::{PipelineStats, RetryPolicy},
    sender::{BatchSink, DispatchOutcome},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// Bundled parameters for the aggregation loop.
pub struct AggregatorParams {
    pub queue: IngestionQueue,
    pub batch_tx: mpsc::Sender<Batch>,
    pub classifier: LineClassifier,
    pub formatter: LineFormatter,
    pub window: Duration,
    pub poll_interval: Duration,
    pub cancel: CancellationToken,
    pub stats: Arc<PipelineStats>,
}

/// Collect lines for one window, seal, hand off, repeat. On cancellation the
/// lines still queued are packed and handed off with `SealReason::Shutdown`.
pub async fn run_aggregator(params: AggregatorParams) {
    let AggregatorParams {
        mut queue,
        batch_tx,
        classifier,
        formatter,
        window,
        poll_interval,
        cancel,
        stats,
    } = params;

    info!(
        "Starting aggregator (window={:?}, poll_interval={:?}, max_length={})",
        window,
        poll_interval,
        formatter.max_length()
    );

    let mut packer = BatchPacker::new(formatter.max_length());

    'windows: loop {
        let deadline = Instant::now() + window;

        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let wait = poll_interval.min(deadline - now);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break 'windows,
                polled = queue.poll(wait) => match polled {
                    QueuePoll::Line(raw) => {
                        accept_line(&raw, &classifier, &formatter, &mut packer, &stats);
                    }
                    QueuePoll::TimedOut => {}
                    QueuePoll::Disconnected => {
                        debug!("All submitters dropped, stopping aggregator");
                        break 'windows;
                    }
                },
            }
        }

        let batches = packer.drain(SealReason::WindowElapsed);
        if !hand_off(&batch_tx, batches, &stats).await {
            warn!("Dispatch worker is gone, stopping aggregator");
            return;
        }
    }

    queue.close();
    while let Some(raw) = queue.try_next() {
        accept_line(&raw, &classifier, &formatter, &mut packer, &stats);
    }

    let batches = packer.drain(SealReason::Shutdown);
    let pending = batches.len();
    if hand_off(&batch_tx, batches, &stats).await && pending > 0 {
        info!("Handed off {pending} batch(es) for the final drain");
    }

    info!("Aggregator stopped");
}

fn accept_line(
    raw: &str,
    classifier: &LineClassifier,
    formatter: &LineFormatter,
    packer: &mut BatchPacker,
    stats: &PipelineStats,
) {
    match format_line(classifier, formatter, raw) {
        Some(line) => packer.push(line),
        None => {
            stats.record_line_rejected();
            trace!("Classifier rejected line: {raw:?}");
        }
    }
}

/// Returns false once the worker side of the channel is closed.
async fn hand_off(
    batch_tx: &mpsc::Sender<Batch>,
    batches: Vec<Batch>,
    stats: &PipelineStats,
) -> bool {
    if batches.is_empty() {
        return true;
    }

    stats.record_batches_sealed(batches.len());
    for batch in batches {
        debug!(
            "Sealed batch {} ({} lines, {} chars, {:?})",
            batch.id(),
            batch.line_count(),
            batch.char_len(),
            batch.seal_reason()
        );
        if batch_tx.send(batch).await.is_err() {
            return false;
        }
    }
    true
}

/// Bundled parameters for the dispatch worker.
pub struct DispatchWorkerParams<S: BatchSink> {
    pub sink: S,
    pub batch_rx: mpsc::Receiver<Batch>,
    pub retry_policy: RetryPolicy,
    pub cancel: CancellationToken,
    pub stats: Arc<PipelineStats>,
}

/// Sends batches one at a time, in hand-off order, until the aggregator drops
/// its end of the channel.
pub async fn run_dispatch_worker<S: BatchSink>(params: DispatchWorkerParams<S>) {
    let DispatchWorkerParams {
        sink,
        mut batch_rx,
        retry_policy,
        cancel,
        stats,
    } = params;

    info!(
        "Starting dispatch worker (rate limit retries={})",
        retry_policy.config().max_attempts
    );

    while let Some(batch) = batch_rx.recv().await {
        dispatch_with_policy(&sink, &batch, &retry_policy, &cancel, &stats).await;
    }

    info!("Dispatch worker stopped");
}

/// Dispatches one batch and applies the rate-limit policy to the outcome.
pub async fn dispatch_with_policy<S: BatchSink>(
    sink: &S,
    batch: &Batch,
    retry_policy: &RetryPolicy,
    cancel: &CancellationToken,
    stats: &PipelineStats,
) -> DispatchOutcome {
    let mut attempt = 0;

    loop {
        let outcome = sink.dispatch(batch).await;
        stats.record_outcome(&outcome);

        match &outcome {
            DispatchOutcome::Delivered => return outcome,
            DispatchOutcome::RateLimited { retry_after } => {
                if !retry_policy.should_retry(attempt) || cancel.is_cancelled() {
                    warn!(
                        "Dropping rate-limited batch {} ({} lines)",
                        batch.id(),
                        batch.line_count()
                    );
                    return outcome;
                }

                let delay = retry_policy.delay_for(attempt, *retry_after);
                debug!(
                    "Retrying batch {} in {:?} (attempt {})",
                    batch.id(),
                    delay,
                    attempt + 1
                );

                tokio::select! {
                    _ = cancel.cancelled() => {
                        warn!("Dropping batch {} during back-off: shutting down", batch.id());
                        return outcome;
                    }
                    _ = tokio::time::sleep(delay) => {}
                }

                attempt += 1;
                stats.record_retry();
            }
            DispatchOutcome::Rejected(reason) => {
                trace!("Batch {} refused: {reason}", batch.id());
                return outcome;
            }
            DispatchOutcome::TransportError(details) => {
                debug!("Batch {} lost: {details}", batch.id());
                return outcome;
            }
        }
    }
}
