use tokio::signal;
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal as unix_signal};
use tracing::{error, info};

/// Which event ended the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownTrigger {
    Interrupt,
    Terminate,
    InputClosed,
}

/// Resolves on SIGINT or SIGTERM. If no handler can be installed this never
/// resolves, leaving end-of-input as the only way out.
pub async fn wait_for_signal() -> ShutdownTrigger {
    #[cfg(unix)]
    {
        let mut sigterm = match unix_signal(SignalKind::terminate()) {
            Ok(sigterm) => Some(sigterm),
            Err(err) => {
                error!("Failed to create SIGTERM handler: {}", err);
                None
            }
        };

        tokio::select! {
            result = signal::ctrl_c() => match result {
                Ok(()) => {
                    info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
                    ShutdownTrigger::Interrupt
                }
                Err(err) => {
                    error!("Failed to listen for SIGINT: {}", err);
                    std::future::pending().await
                }
            },
            _ = async {
                match sigterm.as_mut() {
                    Some(sigterm) => sigterm.recv().await,
                    None => std::future::pending().await,
                }
            } => {
                info!("Received SIGTERM, initiating graceful shutdown");
                ShutdownTrigger::Terminate
            }
        }
    }

    #[cfg(not(unix))]
    {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
                ShutdownTrigger::Interrupt
            }
            Err(err) => {
                error!("Failed to listen for SIGINT: {}", err);
                std::future::pending().await
            }
        }
    }
}
