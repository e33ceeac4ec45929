pub mod config;
pub mod logging_system;
pub mod pipeline;
pub mod service;
pub mod shutdown;

pub use config::{Config, ConfigError, LogLevel};
pub use logging_system::{LoggingSystem, setup_logging};
pub use service::{Pipeline, ShutdownOutcome};
pub use shutdown::{ShutdownTrigger, wait_for_signal};

use crate::domain::ForwarderError;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, info, warn};

pub struct App {
    config: Config,
    pipeline: Pipeline,
}

impl App {
    pub fn from_args<I, T>(args: I) -> Result<Self, ForwarderError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let config = Config::from_args_and_env(args)?;
        Self::from_config(config)
    }

    /// Must be called inside a tokio runtime.
    pub fn from_config(config: Config) -> Result<Self, ForwarderError> {
        setup_logging(config.log_level, config.log_json)?;

        info!("Starting webhook-log-forwarder v{}", env!("CARGO_PKG_VERSION"));
        info!(
            "Configuration: window={:?}, max_message_length={}, rate_limit_retries={}",
            config.rate_limit_interval, config.max_message_length, config.rate_limit_retries
        );

        let pipeline = Pipeline::with_webhook(&config)?;
        Ok(Self { config, pipeline })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Forwards stdin line by line until it closes or a signal arrives, then
    /// shuts the pipeline down.
    pub async fn run(self) -> Result<ShutdownOutcome, ForwarderError> {
        info!("webhook-log-forwarder is reading stdin. Press Ctrl+C to stop.");
        self.run_with_input(tokio::io::stdin()).await
    }

    pub async fn run_with_input<R>(self, input: R) -> Result<ShutdownOutcome, ForwarderError>
    where
        R: AsyncRead + Unpin,
    {
        let trigger = tokio::select! {
            trigger = forward_lines(input, &self.pipeline) => trigger,
            trigger = wait_for_signal() => trigger,
        };
        debug!("Shutdown triggered by {:?}", trigger);

        let outcome = self.pipeline.shutdown().await;
        let stats = self.pipeline.stats();
        info!(
            "webhook-log-forwarder stopped ({:?}): {} lines, {} batches delivered, {} rate limited, {} failed",
            outcome,
            stats.lines_submitted,
            stats.delivered,
            stats.rate_limited,
            stats.transport_errors + stats.rejected
        );

        if outcome == ShutdownOutcome::TimedOut {
            return Err(ForwarderError::Shutdown(
                "pending batches abandoned after the grace period".to_string(),
            ));
        }
        Ok(outcome)
    }
}

async fn forward_lines<R: AsyncRead + Unpin>(input: R, pipeline: &Pipeline) -> ShutdownTrigger {
    let submitter = pipeline.submitter();
    let mut reader = BufReader::new(input);
    let mut buf = Vec::with_capacity(1024);

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => {
                info!("Input closed, initiating graceful shutdown");
                return ShutdownTrigger::InputClosed;
            }
            Ok(_) => submitter.submit(decode_line(&buf)),
            Err(e) => {
                warn!("Failed to read input: {e}");
                return ShutdownTrigger::InputClosed;
            }
        }
    }
}

/// Invalid UTF-8 is replaced rather than dropped.
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}
