//! Job queue repository functions.
//!
//! The background queue is backed by the `job_queue` Postgres table.
//! Workers poll the table and use `SELECT … FOR UPDATE SKIP LOCKED`
//! for safe concurrent processing.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    DbError,
    models::{JobRow, JobStatus},
};

const JOB_COLUMNS: &str =
    "id, workflow_id, status, attempts, max_attempts, payload, created_at, updated_at";

/// Enqueue a new job for the given workflow.
///
/// `payload` is the input data the worker will hand to the engine.
pub async fn enqueue_job(
    pool: &PgPool,
    workflow_id: Uuid,
    payload: serde_json::Value,
    max_attempts: i32,
) -> Result<JobRow, DbError> {
    let row = sqlx::query_as::<_, JobRow>(&format!(
        r#"
        INSERT INTO job_queue
            (id, workflow_id, status, attempts, max_attempts, payload, created_at, updated_at)
        VALUES ($1, $2, $3, 0, $4, $5, $6, $6)
        RETURNING {JOB_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(workflow_id)
    .bind(JobStatus::Pending.to_string())
    .bind(max_attempts)
    .bind(payload)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Atomically fetch the oldest pending job and mark it as `processing`.
///
/// Uses `SELECT … FOR UPDATE SKIP LOCKED` so multiple workers can poll
/// safely without stepping on each other.
///
/// Returns `None` if no pending jobs exist.
pub async fn fetch_next_job(pool: &PgPool) -> Result<Option<JobRow>, DbError> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, JobRow>(&format!(
        r#"
        SELECT {JOB_COLUMNS}
        FROM job_queue
        WHERE status = 'pending'
        ORDER BY created_at ASC
        LIMIT 1
        FOR UPDATE SKIP LOCKED
        "#
    ))
    .fetch_optional(&mut *tx)
    .await?;

    let Some(job) = row else {
        tx.rollback().await?;
        return Ok(None);
    };

    let claimed = sqlx::query_as::<_, JobRow>(&format!(
        r#"
        UPDATE job_queue
        SET status = $1, attempts = attempts + 1, updated_at = $2
        WHERE id = $3
        RETURNING {JOB_COLUMNS}
        "#
    ))
    .bind(JobStatus::Processing.to_string())
    .bind(Utc::now())
    .bind(job.id)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok(Some(claimed))
}

/// Mark a job as completed.
pub async fn complete_job(pool: &PgPool, job_id: Uuid) -> Result<(), DbError> {
    sqlx::query("UPDATE job_queue SET status = $1, updated_at = $2 WHERE id = $3")
        .bind(JobStatus::Completed.to_string())
        .bind(Utc::now())
        .bind(job_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Return a failed job to `pending`, or dead-letter it once its
/// `max_attempts` are used up.
pub async fn fail_job(pool: &PgPool, job_id: Uuid) -> Result<(), DbError> {
    sqlx::query(
        r#"
        UPDATE job_queue
        SET status = CASE WHEN attempts >= max_attempts THEN $1 ELSE $2 END,
            updated_at = $3
        WHERE id = $4
        "#,
    )
    .bind(JobStatus::DeadLettered.to_string())
    .bind(JobStatus::Pending.to_string())
    .bind(Utc::now())
    .bind(job_id)
    .execute(pool)
    .await?;
    Ok(())
}
