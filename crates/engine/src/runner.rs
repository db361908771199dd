//! Sequential task runner.
//!
//! Runs a workflow's tasks in ascending `order_index` (ties keep creation
//! order) against a shared [`ExecutionContext`]. A task's failure is
//! recorded under its name and the run continues; only an unresolvable
//! task type stops the run, and that is detected before any task starts.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use executors::{ExecutionContext, ExecutorRegistry, TaskError, TaskExecutor};

use crate::models::Task;
use crate::EngineError;

/// How a single task ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Ok(Value),
    /// Isolated failure; the run carries on.
    Failed(String),
}

impl TaskOutcome {
    /// The value stored in the per-task result map.
    pub fn into_value(self) -> Value {
        match self {
            Self::Ok(value) => value,
            Self::Failed(message) => json!({ "success": false, "error": message }),
        }
    }
}

impl From<Result<Value, TaskError>> for TaskOutcome {
    fn from(result: Result<Value, TaskError>) -> Self {
        match result {
            Ok(value) => Self::Ok(value),
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}

/// Per-task results plus the final context.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub tasks: Map<String, Value>,
    pub context: ExecutionContext,
}

impl RunOutput {
    /// `{"tasks": {...}, "context": {...}}`, as stored on the execution.
    pub fn into_result(self) -> Value {
        json!({
            "tasks": Value::Object(self.tasks),
            "context": self.context.into_value(),
        })
    }
}

/// Tasks in execution order: ascending `order_index`, stable for ties.
pub fn execution_order(tasks: &[Task]) -> Vec<&Task> {
    let mut ordered: Vec<&Task> = tasks.iter().collect();
    ordered.sort_by_key(|t| t.order_index);
    ordered
}

/// Resolve every task's executor up front.
///
/// # Errors
/// [`EngineError::UnsupportedTaskType`] for the first task (in execution
/// order) whose type has no registered executor.
fn plan<'a>(
    registry: &ExecutorRegistry,
    tasks: &'a [Task],
) -> Result<Vec<(&'a Task, Arc<dyn TaskExecutor>)>, EngineError> {
    execution_order(tasks)
        .into_iter()
        .map(|task| {
            registry
                .get(&task.task_type)
                .map(|executor| (task, executor))
                .map_err(|_| EngineError::UnsupportedTaskType {
                    task: task.name.clone(),
                    task_type: task.task_type.clone(),
                })
        })
        .collect()
}

/// Run `tasks` against a context seeded with `input`.
pub async fn run_tasks(
    registry: &ExecutorRegistry,
    tasks: &[Task],
    input: Value,
) -> Result<RunOutput, EngineError> {
    let plan = plan(registry, tasks)?;
    let mut context = ExecutionContext::new(input);
    let mut results = Map::new();

    for (task, executor) in plan {
        debug!(task = %task.name, task_type = %task.task_type, "running task");

        match TaskOutcome::from(executor.execute(&task.configuration, &context).await) {
            TaskOutcome::Ok(value) => {
                results.insert(task.name.clone(), value.clone());
                context.insert(task.name.clone(), value);
            }
            // Failures are reported but never become visible to later tasks.
            TaskOutcome::Failed(message) => {
                warn!(task = %task.name, "task failed: {message}");
                results.insert(task.name.clone(), TaskOutcome::Failed(message).into_value());
            }
        }
    }

    Ok(RunOutput { tasks: results, context })
}
