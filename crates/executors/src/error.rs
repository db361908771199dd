//! Executor-level error types.

use thiserror::Error;

/// Errors returned by a task executor's `execute` method.
///
/// These are distinct from a result carrying `"success": false`: an executor
/// returns a failed *result* when the work itself did not succeed (a 404, a
/// refused connection) and a `TaskError` when it could not run at all.
/// The engine isolates a `TaskError` to the task that raised it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TaskError {
    /// The task's configuration map could not be interpreted.
    #[error("invalid task configuration: {0}")]
    InvalidConfig(String),

    /// The executor failed unexpectedly.
    #[error("{0}")]
    Failed(String),
}

impl From<serde_json::Error> for TaskError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}

/// Returned by the registry when no executor is bound to a type tag.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unsupported task type: {0}")]
pub struct UnsupportedTaskType(pub String);
