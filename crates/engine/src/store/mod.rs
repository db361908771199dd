//! Persistence seam for workflows and their execution history.
//!
//! [`PgStore`] is the production backend; [`MemoryStore`] keeps everything
//! in process so the engine and API can be exercised without Postgres.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{
    Execution, ExecutionOutcome, ExecutionStatus, NewWorkflow, Page, Workflow, WorkflowFilter,
    WorkflowUpdate,
};

/// Owner-scoped workflow storage plus execution records.
///
/// Methods taking an `owner` treat a workflow owned by someone else exactly
/// like a missing one.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Persist a workflow and its tasks atomically.
    async fn create_workflow(&self, owner: Uuid, new: NewWorkflow) -> Result<Workflow, StoreError>;

    async fn get_workflow(&self, id: Uuid, owner: Uuid) -> Result<Option<Workflow>, StoreError>;

    /// Load a workflow with its tasks regardless of owner (engine use).
    async fn load_workflow(&self, id: Uuid) -> Result<Option<Workflow>, StoreError>;

    /// Newest first.
    async fn list_workflows(
        &self,
        owner: Uuid,
        filter: WorkflowFilter,
    ) -> Result<Page<Workflow>, StoreError>;

    async fn update_workflow(
        &self,
        id: Uuid,
        owner: Uuid,
        update: WorkflowUpdate,
    ) -> Result<Option<Workflow>, StoreError>;

    /// Delete a workflow with its tasks and executions. Returns whether a
    /// workflow was removed.
    async fn delete_workflow(&self, id: Uuid, owner: Uuid) -> Result<bool, StoreError>;

    async fn create_execution(
        &self,
        workflow_id: Uuid,
        status: ExecutionStatus,
        started_at: Option<DateTime<Utc>>,
    ) -> Result<Execution, StoreError>;

    /// Apply the single terminal update to an execution.
    async fn finish_execution(
        &self,
        id: Uuid,
        outcome: ExecutionOutcome,
    ) -> Result<Execution, StoreError>;

    /// Newest first.
    async fn list_executions(
        &self,
        workflow_id: Uuid,
        skip: u32,
        limit: u32,
    ) -> Result<Page<Execution>, StoreError>;

    /// Cheap liveness check of the backend.
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
