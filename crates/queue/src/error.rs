//! Queue-level error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    /// The in-process channel has no receiver left.
    #[error("job queue is closed")]
    Closed,

    #[error("queue storage error: {0}")]
    Database(#[from] db::DbError),
}
