//! Workflow execution lifecycle.
//!
//! `WorkflowExecutor` is the central orchestrator:
//! 1. Opens an execution record in `running`.
//! 2. Loads the workflow and its tasks from the store.
//! 3. Runs the tasks through [`crate::runner`].
//! 4. Closes the record exactly once as `completed` or `failed`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{error, info, instrument};
use uuid::Uuid;

use executors::ExecutorRegistry;
use queue::{Job, JobHandler};

use crate::models::{Execution, ExecutionOutcome, ExecutionStatus};
use crate::runner::run_tasks;
use crate::store::WorkflowStore;
use crate::error::{EngineError, StoreError};

/// Runs one workflow at a time per call; cheap to share behind an `Arc`.
pub struct WorkflowExecutor {
    store: Arc<dyn WorkflowStore>,
    registry: Arc<ExecutorRegistry>,
}

impl WorkflowExecutor {
    pub fn new(store: Arc<dyn WorkflowStore>, registry: Arc<ExecutorRegistry>) -> Self {
        Self { store, registry }
    }

    pub fn registry(&self) -> &ExecutorRegistry {
        &self.registry
    }

    /// Run `workflow_id` synchronously and return its terminal execution.
    ///
    /// Once the record is open, any failure (the workflow cannot be loaded
    /// or has vanished, is inactive, or uses an unsupported task type)
    /// yields `Ok` with a `failed` execution carrying the message. A null
    /// `input` is treated as `{}`.
    ///
    /// # Errors
    /// [`EngineError::WorkflowNotFound`] if no record can be opened because
    /// the workflow does not exist, or a store error if the record cannot be
    /// created or closed.
    #[instrument(skip(self, input), fields(workflow_id = %workflow_id))]
    pub async fn execute_workflow(
        &self,
        workflow_id: Uuid,
        input: Value,
    ) -> Result<Execution, EngineError> {
        let input = if input.is_null() { Value::Object(Map::new()) } else { input };

        let started_at = Utc::now();
        let execution = match self
            .store
            .create_execution(workflow_id, ExecutionStatus::Running, Some(started_at))
            .await
        {
            Ok(execution) => execution,
            Err(StoreError::NotFound) => return Err(EngineError::WorkflowNotFound(workflow_id)),
            Err(e) => return Err(e.into()),
        };
        info!(execution_id = %execution.id, "execution started");

        // From here on every failure, including the load, closes the record.
        let run = match self.store.load_workflow(workflow_id).await {
            Err(e) => Err(EngineError::from(e)),
            Ok(None) => Err(EngineError::WorkflowNotFound(workflow_id)),
            Ok(Some(workflow)) if !workflow.is_active => {
                Err(EngineError::WorkflowInactive(workflow_id))
            }
            Ok(Some(workflow)) => run_tasks(&self.registry, &workflow.tasks, input).await,
        };

        let completed_at = Utc::now();
        let execution_time = (completed_at - started_at)
            .num_seconds()
            .clamp(0, i64::from(i32::MAX)) as i32;

        let outcome = match run {
            Ok(output) => ExecutionOutcome {
                status: ExecutionStatus::Completed,
                completed_at,
                execution_time,
                result: output.into_result(),
                error_message: None,
            },
            Err(e) => {
                error!(execution_id = %execution.id, "execution failed: {e}");
                ExecutionOutcome {
                    status: ExecutionStatus::Failed,
                    completed_at,
                    execution_time,
                    result: Value::Object(Map::new()),
                    error_message: Some(e.to_string()),
                }
            }
        };

        let execution = self.store.finish_execution(execution.id, outcome).await?;
        info!(
            execution_id = %execution.id,
            status = %execution.status,
            execution_time,
            "execution finished"
        );
        Ok(execution)
    }
}

/// Background jobs run the same synchronous path.
#[async_trait]
impl JobHandler for WorkflowExecutor {
    async fn handle(&self, job: &Job) -> anyhow::Result<()> {
        self.execute_workflow(job.workflow_id, job.input.clone()).await?;
        Ok(())
    }
}
