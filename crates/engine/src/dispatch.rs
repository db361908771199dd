//! Chooses between running a workflow inline and queueing it.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use queue::JobQueue;

use crate::executor::WorkflowExecutor;
use crate::models::Execution;
use crate::EngineError;

#[derive(Clone)]
pub struct Dispatcher {
    executor: Arc<WorkflowExecutor>,
    queue: Arc<dyn JobQueue>,
}

impl Dispatcher {
    pub fn new(executor: Arc<WorkflowExecutor>, queue: Arc<dyn JobQueue>) -> Self {
        Self { executor, queue }
    }

    pub fn executor(&self) -> &Arc<WorkflowExecutor> {
        &self.executor
    }

    /// Run `workflow_id` now, or hand it to the queue when `background` is
    /// set.
    ///
    /// A queued run returns a `pending` placeholder whose id is the job id;
    /// the real execution record is created when a worker picks the job up.
    pub async fn dispatch(
        &self,
        workflow_id: Uuid,
        input: Value,
        background: bool,
    ) -> Result<Execution, EngineError> {
        if !background {
            return self.executor.execute_workflow(workflow_id, input).await;
        }

        let handle = self.queue.submit(workflow_id, input).await?;
        info!(job_id = %handle.id, %workflow_id, "execution queued");
        Ok(Execution::pending_view(handle.id, workflow_id))
    }
}
