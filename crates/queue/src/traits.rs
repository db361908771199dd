//! Seams between the queue backends, the worker and the engine.

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::{Job, JobHandle, QueueError};

/// Submission side of a queue.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Enqueue a run of `workflow_id` with `input`; returns without waiting
    /// for the run to start.
    async fn submit(&self, workflow_id: Uuid, input: Value) -> Result<JobHandle, QueueError>;
}

/// Consumption side of a queue, polled by [`crate::Worker`].
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Claim the next pending job, if any. Never blocks waiting for one.
    async fn next_job(&self) -> Result<Option<Job>, QueueError>;

    async fn complete(&self, job: &Job) -> Result<(), QueueError>;

    /// Record a failed delivery; the backend decides between redelivery and
    /// dead-lettering based on `attempts` and `max_attempts`.
    async fn fail(&self, job: &Job, reason: &str) -> Result<(), QueueError>;
}

/// Whatever actually runs a job.
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn handle(&self, job: &Job) -> anyhow::Result<()>;
}
