//! Job types shared by every queue backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Default number of deliveries before a job is dead-lettered.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// One queued workflow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub workflow_id: Uuid,
    /// Input data for the run.
    pub input: Value,
    /// Deliveries so far, including the current one.
    pub attempts: u32,
    pub max_attempts: u32,
}

impl Job {
    pub fn new(workflow_id: Uuid, input: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            workflow_id,
            input,
            attempts: 0,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl From<db::models::JobRow> for Job {
    fn from(row: db::models::JobRow) -> Self {
        Self {
            id: row.id,
            workflow_id: row.workflow_id,
            input: row.payload,
            attempts: row.attempts.max(0) as u32,
            max_attempts: row.max_attempts.max(0) as u32,
        }
    }
}

/// Returned to the submitter; the id is all the caller gets to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub id: Uuid,
}
