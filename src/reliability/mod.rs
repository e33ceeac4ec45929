pub mod metrics;
pub mod retry;

pub use metrics::{PipelineStats, StatsSnapshot};
pub use retry::{RetryConfig, RetryPolicy, RetryStrategy};
