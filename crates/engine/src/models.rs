//! Core domain models for the workflow engine.
//!
//! These types are the source of truth for what a workflow looks like in
//! memory. The `db` crate's row structs convert into them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use uuid::Uuid;

pub use db::models::ExecutionStatus;

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// One configured step of a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub workflow_id: Uuid,
    pub name: String,
    /// Type tag selecting the executor (`http_request`, `email`, …).
    #[serde(rename = "type")]
    pub task_type: String,
    pub configuration: Value,
    /// Execution order; ties keep creation order.
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

impl From<db::models::TaskRow> for Task {
    fn from(row: db::models::TaskRow) -> Self {
        Self {
            id: row.id,
            workflow_id: row.workflow_id,
            name: row.name,
            task_type: row.task_type,
            configuration: row.configuration,
            order_index: row.order_index,
            created_at: row.created_at,
        }
    }
}

/// A task submitted as part of a new workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub name: String,
    #[serde(rename = "type")]
    pub task_type: String,
    #[serde(default = "empty_object")]
    pub configuration: Value,
    #[serde(default)]
    pub order_index: i32,
}

impl From<NewTask> for db::models::NewTask {
    fn from(task: NewTask) -> Self {
        Self {
            name: task.name,
            task_type: task.task_type,
            configuration: task.configuration,
            order_index: task.order_index,
        }
    }
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// A workflow with its tasks, in execution order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub configuration: Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tasks: Vec<Task>,
}

impl Workflow {
    pub fn from_rows(row: db::models::WorkflowRow, tasks: Vec<db::models::TaskRow>) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            description: row.description,
            configuration: row.configuration,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
            tasks: tasks.into_iter().map(Task::from).collect(),
        }
    }
}

/// Everything needed to create a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWorkflow {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "empty_object")]
    pub configuration: Value,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub tasks: Vec<NewTask>,
}

impl NewWorkflow {
    pub fn into_row(self, user_id: Uuid) -> db::models::NewWorkflow {
        db::models::NewWorkflow {
            user_id,
            name: self.name,
            description: self.description,
            configuration: self.configuration,
            is_active: self.is_active,
            tasks: self.tasks.into_iter().map(Into::into).collect(),
        }
    }
}

/// Partial update; `None` fields are left untouched. Tasks are immutable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub configuration: Option<Value>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl From<WorkflowUpdate> for db::models::WorkflowChanges {
    fn from(update: WorkflowUpdate) -> Self {
        Self {
            name: update.name,
            description: update.description,
            configuration: update.configuration,
            is_active: update.is_active,
        }
    }
}

/// Listing filter and pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowFilter {
    pub is_active: Option<bool>,
    pub skip: u32,
    pub limit: u32,
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// One historical run of a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub id: Uuid,
    pub workflow_id: Uuid,
    pub status: ExecutionStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Elapsed whole seconds.
    pub execution_time: Option<i32>,
    pub result: Value,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Execution {
    /// The placeholder returned for a queued run before its record exists.
    pub fn pending_view(job_id: Uuid, workflow_id: Uuid) -> Self {
        Self {
            id: job_id,
            workflow_id,
            status: ExecutionStatus::Pending,
            started_at: None,
            completed_at: None,
            execution_time: None,
            result: json!({
                "task_id": job_id.to_string(),
                "message": "Workflow execution started in background",
            }),
            error_message: None,
            created_at: Utc::now(),
        }
    }
}

impl TryFrom<db::models::WorkflowExecutionRow> for Execution {
    type Error = String;

    fn try_from(row: db::models::WorkflowExecutionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            workflow_id: row.workflow_id,
            status: row.status.parse()?,
            started_at: row.started_at,
            completed_at: row.completed_at,
            execution_time: row.execution_time,
            result: row.result.unwrap_or_else(empty_object),
            error_message: row.error_message,
            created_at: row.created_at,
        })
    }
}

/// The terminal update computed at the end of a run.
pub type ExecutionOutcome = db::models::ExecutionOutcome;

/// A page of results plus the unpaginated total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

fn default_true() -> bool {
    true
}
