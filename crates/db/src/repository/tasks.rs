//! Task reads. Tasks are written only alongside their workflow.

use sqlx::PgPool;
use uuid::Uuid;

use crate::{DbError, models::TaskRow};

const TASK_COLUMNS: &str =
    "id, workflow_id, name, task_type, configuration, order_index, position, created_at";

/// All tasks of one workflow, in `(order_index, position)` order.
pub async fn list_tasks(pool: &PgPool, workflow_id: Uuid) -> Result<Vec<TaskRow>, DbError> {
    let rows = sqlx::query_as::<_, TaskRow>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE workflow_id = $1 ORDER BY order_index, position"
    ))
    .bind(workflow_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Tasks of several workflows at once (used when listing workflows).
pub async fn list_tasks_for_workflows(
    pool: &PgPool,
    workflow_ids: &[Uuid],
) -> Result<Vec<TaskRow>, DbError> {
    if workflow_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, TaskRow>(&format!(
        r#"
        SELECT {TASK_COLUMNS} FROM tasks
        WHERE workflow_id = ANY($1)
        ORDER BY workflow_id, order_index, position
        "#
    ))
    .bind(workflow_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
