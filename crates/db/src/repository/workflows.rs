//! Workflow CRUD operations.
//!
//! Reads and writes are scoped by `user_id`: a workflow owned by someone
//! else behaves exactly like a missing one.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    DbError,
    models::{NewWorkflow, TaskRow, WorkflowChanges, WorkflowRow},
};

const WORKFLOW_COLUMNS: &str =
    "id, user_id, name, description, configuration, is_active, created_at, updated_at";

/// Insert a workflow together with its tasks in one transaction.
pub async fn create_workflow(
    pool: &PgPool,
    new: &NewWorkflow,
) -> Result<(WorkflowRow, Vec<TaskRow>), DbError> {
    let id = Uuid::new_v4();
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let workflow = sqlx::query_as::<_, WorkflowRow>(&format!(
        r#"
        INSERT INTO workflows (id, user_id, name, description, configuration, is_active, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
        RETURNING {WORKFLOW_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(new.user_id)
    .bind(&new.name)
    .bind(&new.description)
    .bind(&new.configuration)
    .bind(new.is_active)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    let mut tasks = Vec::with_capacity(new.tasks.len());
    for (position, task) in new.tasks.iter().enumerate() {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            INSERT INTO tasks (id, workflow_id, name, task_type, configuration, order_index, position, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, workflow_id, name, task_type, configuration, order_index, position, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(id)
        .bind(&task.name)
        .bind(&task.task_type)
        .bind(&task.configuration)
        .bind(task.order_index)
        .bind(position as i32)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;
        tasks.push(row);
    }

    tx.commit().await?;
    Ok((workflow, tasks))
}

/// Fetch a single workflow by its primary key, regardless of owner.
pub async fn get_workflow(pool: &PgPool, id: Uuid) -> Result<WorkflowRow, DbError> {
    let row = sqlx::query_as::<_, WorkflowRow>(&format!(
        "SELECT {WORKFLOW_COLUMNS} FROM workflows WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Fetch a workflow owned by `user_id`.
pub async fn get_owned_workflow(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<WorkflowRow, DbError> {
    let row = sqlx::query_as::<_, WorkflowRow>(&format!(
        "SELECT {WORKFLOW_COLUMNS} FROM workflows WHERE id = $1 AND user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Return one page of a user's workflows (newest first) and the total count.
pub async fn list_workflows(
    pool: &PgPool,
    user_id: Uuid,
    is_active: Option<bool>,
    skip: i64,
    limit: i64,
) -> Result<(Vec<WorkflowRow>, i64), DbError> {
    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM workflows
        WHERE user_id = $1 AND ($2::BOOLEAN IS NULL OR is_active = $2)
        "#,
    )
    .bind(user_id)
    .bind(is_active)
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query_as::<_, WorkflowRow>(&format!(
        r#"
        SELECT {WORKFLOW_COLUMNS} FROM workflows
        WHERE user_id = $1 AND ($2::BOOLEAN IS NULL OR is_active = $2)
        ORDER BY created_at DESC
        OFFSET $3 LIMIT $4
        "#
    ))
    .bind(user_id)
    .bind(is_active)
    .bind(skip)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok((rows, total))
}

/// Apply a partial update and bump `updated_at`.
///
/// Returns `DbError::NotFound` if the workflow is absent or not owned.
pub async fn update_workflow(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
    changes: &WorkflowChanges,
) -> Result<WorkflowRow, DbError> {
    let row = sqlx::query_as::<_, WorkflowRow>(&format!(
        r#"
        UPDATE workflows
        SET name          = COALESCE($3, name),
            description   = COALESCE($4, description),
            configuration = COALESCE($5, configuration),
            is_active     = COALESCE($6, is_active),
            updated_at    = $7
        WHERE id = $1 AND user_id = $2
        RETURNING {WORKFLOW_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(user_id)
    .bind(&changes.name)
    .bind(&changes.description)
    .bind(&changes.configuration)
    .bind(changes.is_active)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Permanently delete a workflow; tasks, executions, schedules and queued
/// jobs go with it through `ON DELETE CASCADE`.
///
/// Returns `DbError::NotFound` if no row was deleted.
pub async fn delete_workflow(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM workflows WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
