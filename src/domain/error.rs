use thiserror::Error;

/// Top-level error type for the forwarder pipeline.
#[derive(Error, Debug)]
pub enum ForwarderError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::app::ConfigError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] crate::sender::DispatchError),

    #[error("Submit error: {0}")]
    Submit(#[from] crate::buffer::SubmitError),

    #[error("Logging error: {0}")]
    Logging(String),

    #[error("Shutdown error: {0}")]
    Shutdown(String),
}
