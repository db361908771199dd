//! Workflow execution repository functions.
//!
//! An execution row is written twice: once on creation and once for its
//! terminal update. There is no intermediate checkpointing.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    DbError,
    models::{ExecutionOutcome, ExecutionStatus, WorkflowExecutionRow},
};

const EXECUTION_COLUMNS: &str = "id, workflow_id, status, started_at, completed_at, \
     execution_time, result, error_message, created_at";

/// Create a new workflow execution record with an empty result.
///
/// Returns `DbError::NotFound` if `workflow_id` does not reference a
/// workflow.
pub async fn create_execution(
    pool: &PgPool,
    workflow_id: Uuid,
    status: ExecutionStatus,
    started_at: Option<DateTime<Utc>>,
) -> Result<WorkflowExecutionRow, DbError> {
    let row = sqlx::query_as::<_, WorkflowExecutionRow>(&format!(
        r#"
        INSERT INTO workflow_executions (id, workflow_id, status, started_at, result, created_at)
        VALUES ($1, $2, $3, $4, '{{}}'::jsonb, $5)
        RETURNING {EXECUTION_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(workflow_id)
    .bind(status.as_str())
    .bind(started_at)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => DbError::NotFound,
        _ => DbError::from(e),
    })?;

    Ok(row)
}

/// Apply the terminal update to an execution.
pub async fn finish_execution(
    pool: &PgPool,
    execution_id: Uuid,
    outcome: &ExecutionOutcome,
) -> Result<WorkflowExecutionRow, DbError> {
    let row = sqlx::query_as::<_, WorkflowExecutionRow>(&format!(
        r#"
        UPDATE workflow_executions
        SET status = $2, completed_at = $3, execution_time = $4, result = $5, error_message = $6
        WHERE id = $1
        RETURNING {EXECUTION_COLUMNS}
        "#
    ))
    .bind(execution_id)
    .bind(outcome.status.as_str())
    .bind(outcome.completed_at)
    .bind(outcome.execution_time)
    .bind(&outcome.result)
    .bind(&outcome.error_message)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// One page of a workflow's execution history (newest first) and the total.
pub async fn list_executions(
    pool: &PgPool,
    workflow_id: Uuid,
    skip: i64,
    limit: i64,
) -> Result<(Vec<WorkflowExecutionRow>, i64), DbError> {
    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM workflow_executions WHERE workflow_id = $1")
            .bind(workflow_id)
            .fetch_one(pool)
            .await?;

    let rows = sqlx::query_as::<_, WorkflowExecutionRow>(&format!(
        r#"
        SELECT {EXECUTION_COLUMNS} FROM workflow_executions
        WHERE workflow_id = $1
        ORDER BY created_at DESC
        OFFSET $2 LIMIT $3
        "#
    ))
    .bind(workflow_id)
    .bind(skip)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok((rows, total))
}
