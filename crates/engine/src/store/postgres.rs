//! Postgres backend delegating to the `db` crate's repositories.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use db::repository::{executions as execution_repo, tasks as task_repo, workflows as workflow_repo};
use db::DbPool;

use super::WorkflowStore;
use crate::error::StoreError;
use crate::models::{
    Execution, ExecutionOutcome, ExecutionStatus, NewWorkflow, Page, Workflow, WorkflowFilter,
    WorkflowUpdate,
};

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn with_tasks(&self, row: db::models::WorkflowRow) -> Result<Workflow, StoreError> {
        let tasks = task_repo::list_tasks(&self.pool, row.id).await?;
        Ok(Workflow::from_rows(row, tasks))
    }
}

/// `DbError::NotFound` becomes `Ok(None)`; anything else is an error.
fn optional<T>(result: Result<T, db::DbError>) -> Result<Option<T>, StoreError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(db::DbError::NotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn to_execution(row: db::models::WorkflowExecutionRow) -> Result<Execution, StoreError> {
    Execution::try_from(row).map_err(StoreError::Corrupt)
}

#[async_trait]
impl WorkflowStore for PgStore {
    async fn create_workflow(&self, owner: Uuid, new: NewWorkflow) -> Result<Workflow, StoreError> {
        let (row, tasks) = workflow_repo::create_workflow(&self.pool, &new.into_row(owner)).await?;
        Ok(Workflow::from_rows(row, tasks))
    }

    async fn get_workflow(&self, id: Uuid, owner: Uuid) -> Result<Option<Workflow>, StoreError> {
        match optional(workflow_repo::get_owned_workflow(&self.pool, id, owner).await)? {
            Some(row) => Ok(Some(self.with_tasks(row).await?)),
            None => Ok(None),
        }
    }

    async fn load_workflow(&self, id: Uuid) -> Result<Option<Workflow>, StoreError> {
        match optional(workflow_repo::get_workflow(&self.pool, id).await)? {
            Some(row) => Ok(Some(self.with_tasks(row).await?)),
            None => Ok(None),
        }
    }

    async fn list_workflows(
        &self,
        owner: Uuid,
        filter: WorkflowFilter,
    ) -> Result<Page<Workflow>, StoreError> {
        let (rows, total) = workflow_repo::list_workflows(
            &self.pool,
            owner,
            filter.is_active,
            i64::from(filter.skip),
            i64::from(filter.limit),
        )
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut tasks_by_workflow: HashMap<Uuid, Vec<db::models::TaskRow>> = HashMap::new();
        for task in task_repo::list_tasks_for_workflows(&self.pool, &ids).await? {
            tasks_by_workflow.entry(task.workflow_id).or_default().push(task);
        }

        let items = rows
            .into_iter()
            .map(|row| {
                let tasks = tasks_by_workflow.remove(&row.id).unwrap_or_default();
                Workflow::from_rows(row, tasks)
            })
            .collect();

        Ok(Page { items, total: total.max(0) as u64 })
    }

    async fn update_workflow(
        &self,
        id: Uuid,
        owner: Uuid,
        update: WorkflowUpdate,
    ) -> Result<Option<Workflow>, StoreError> {
        let changes = update.into();
        match optional(workflow_repo::update_workflow(&self.pool, id, owner, &changes).await)? {
            Some(row) => Ok(Some(self.with_tasks(row).await?)),
            None => Ok(None),
        }
    }

    async fn delete_workflow(&self, id: Uuid, owner: Uuid) -> Result<bool, StoreError> {
        Ok(optional(workflow_repo::delete_workflow(&self.pool, id, owner).await)?.is_some())
    }

    async fn create_execution(
        &self,
        workflow_id: Uuid,
        status: ExecutionStatus,
        started_at: Option<DateTime<Utc>>,
    ) -> Result<Execution, StoreError> {
        let row =
            execution_repo::create_execution(&self.pool, workflow_id, status, started_at).await?;
        to_execution(row)
    }

    async fn finish_execution(
        &self,
        id: Uuid,
        outcome: ExecutionOutcome,
    ) -> Result<Execution, StoreError> {
        let row = execution_repo::finish_execution(&self.pool, id, &outcome).await?;
        to_execution(row)
    }

    async fn list_executions(
        &self,
        workflow_id: Uuid,
        skip: u32,
        limit: u32,
    ) -> Result<Page<Execution>, StoreError> {
        let (rows, total) = execution_repo::list_executions(
            &self.pool,
            workflow_id,
            i64::from(skip),
            i64::from(limit),
        )
        .await?;

        let items = rows.into_iter().map(to_execution).collect::<Result<_, _>>()?;
        Ok(Page { items, total: total.max(0) as u64 })
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        db::pool::health_check(&self.pool).await?;
        Ok(())
    }
}
