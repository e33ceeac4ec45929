pub mod batch;
pub mod queue;

pub use batch::{Batch, BatchPacker, SealReason};
pub use queue::{IngestionQueue, LineSubmitter, LineSubscriber, QueuePoll, SubmitError};
