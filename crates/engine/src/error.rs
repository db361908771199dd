//! Engine-level error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors raised by a [`crate::WorkflowStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced row does not exist.
    #[error("record not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(db::DbError),

    /// A stored row could not be mapped onto a domain type.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl From<db::DbError> for StoreError {
    fn from(err: db::DbError) -> Self {
        match err {
            db::DbError::NotFound => Self::NotFound,
            other => Self::Database(other),
        }
    }
}

/// Errors produced by the workflow engine (validation + execution).
#[derive(Debug, Error)]
pub enum EngineError {
    // ------ Run errors: recorded on the execution as `failed` ------

    #[error("Workflow {0} not found")]
    WorkflowNotFound(Uuid),

    #[error("Workflow {0} is not active")]
    WorkflowInactive(Uuid),

    /// A task names a type with no registered executor.
    #[error("Unsupported task type: {task_type} (task '{task}')")]
    UnsupportedTaskType { task: String, task_type: String },

    // ------ Validation errors ------

    #[error("invalid workflow: {0}")]
    InvalidWorkflow(String),

    // ------ Infrastructure errors: propagated to the caller ------

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Queue(#[from] queue::QueueError),
}
