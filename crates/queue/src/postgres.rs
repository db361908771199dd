//! Postgres-backed queue on the `job_queue` table.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use db::repository::jobs as job_repo;
use db::DbPool;

use crate::job::DEFAULT_MAX_ATTEMPTS;
use crate::{Job, JobHandle, JobQueue, JobSource, QueueError};

#[derive(Clone)]
pub struct PgQueue {
    pool: DbPool,
}

impl PgQueue {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobQueue for PgQueue {
    async fn submit(&self, workflow_id: Uuid, input: Value) -> Result<JobHandle, QueueError> {
        let row =
            job_repo::enqueue_job(&self.pool, workflow_id, input, DEFAULT_MAX_ATTEMPTS as i32)
                .await?;
        info!(job_id = %row.id, %workflow_id, "job enqueued");
        Ok(JobHandle { id: row.id })
    }
}

#[async_trait]
impl JobSource for PgQueue {
    async fn next_job(&self) -> Result<Option<Job>, QueueError> {
        Ok(job_repo::fetch_next_job(&self.pool).await?.map(Job::from))
    }

    async fn complete(&self, job: &Job) -> Result<(), QueueError> {
        job_repo::complete_job(&self.pool, job.id).await?;
        Ok(())
    }

    async fn fail(&self, job: &Job, reason: &str) -> Result<(), QueueError> {
        warn!(job_id = %job.id, attempts = job.attempts, "job failed: {reason}");
        job_repo::fail_job(&self.pool, job.id).await?;
        Ok(())
    }
}
