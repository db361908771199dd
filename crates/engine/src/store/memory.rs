//! In-process backend used by tests and `serve --in-memory`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::WorkflowStore;
use crate::error::StoreError;
use crate::models::{
    Execution, ExecutionOutcome, ExecutionStatus, NewWorkflow, Page, Task, Workflow,
    WorkflowFilter, WorkflowUpdate,
};

#[derive(Default)]
struct State {
    workflows: HashMap<Uuid, Workflow>,
    /// Workflow ids in creation order.
    workflow_order: Vec<Uuid>,
    /// Executions in creation order.
    executions: Vec<Execution>,
}

/// Mirrors the Postgres backend's semantics, including cascading deletes
/// and the execution → workflow foreign key.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn page<T: Clone>(newest_first: impl Iterator<Item = T>, skip: u32, limit: u32) -> Page<T> {
    let all: Vec<T> = newest_first.collect();
    let total = all.len() as u64;
    let items = all
        .into_iter()
        .skip(skip as usize)
        .take(limit as usize)
        .collect();
    Page { items, total }
}

#[async_trait]
impl WorkflowStore for MemoryStore {
    async fn create_workflow(&self, owner: Uuid, new: NewWorkflow) -> Result<Workflow, StoreError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let mut tasks: Vec<Task> = new
            .tasks
            .into_iter()
            .map(|t| Task {
                id: Uuid::new_v4(),
                workflow_id: id,
                name: t.name,
                task_type: t.task_type,
                configuration: t.configuration,
                order_index: t.order_index,
                created_at: now,
            })
            .collect();
        tasks.sort_by_key(|t| t.order_index);

        let workflow = Workflow {
            id,
            user_id: owner,
            name: new.name,
            description: new.description,
            configuration: new.configuration,
            is_active: new.is_active,
            created_at: now,
            updated_at: now,
            tasks,
        };

        let mut state = self.state.write().await;
        state.workflows.insert(id, workflow.clone());
        state.workflow_order.push(id);
        Ok(workflow)
    }

    async fn get_workflow(&self, id: Uuid, owner: Uuid) -> Result<Option<Workflow>, StoreError> {
        let state = self.state.read().await;
        Ok(state.workflows.get(&id).filter(|w| w.user_id == owner).cloned())
    }

    async fn load_workflow(&self, id: Uuid) -> Result<Option<Workflow>, StoreError> {
        Ok(self.state.read().await.workflows.get(&id).cloned())
    }

    async fn list_workflows(
        &self,
        owner: Uuid,
        filter: WorkflowFilter,
    ) -> Result<Page<Workflow>, StoreError> {
        let state = self.state.read().await;
        let matching = state
            .workflow_order
            .iter()
            .rev()
            .filter_map(|id| state.workflows.get(id))
            .filter(|w| w.user_id == owner)
            .filter(|w| filter.is_active.map_or(true, |active| w.is_active == active))
            .cloned();
        Ok(page(matching, filter.skip, filter.limit))
    }

    async fn update_workflow(
        &self,
        id: Uuid,
        owner: Uuid,
        update: WorkflowUpdate,
    ) -> Result<Option<Workflow>, StoreError> {
        let mut state = self.state.write().await;
        let Some(workflow) = state.workflows.get_mut(&id).filter(|w| w.user_id == owner) else {
            return Ok(None);
        };

        if let Some(name) = update.name {
            workflow.name = name;
        }
        if let Some(description) = update.description {
            workflow.description = Some(description);
        }
        if let Some(configuration) = update.configuration {
            workflow.configuration = configuration;
        }
        if let Some(is_active) = update.is_active {
            workflow.is_active = is_active;
        }
        workflow.updated_at = Utc::now();

        Ok(Some(workflow.clone()))
    }

    async fn delete_workflow(&self, id: Uuid, owner: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        if !state.workflows.get(&id).is_some_and(|w| w.user_id == owner) {
            return Ok(false);
        }

        state.workflows.remove(&id);
        state.workflow_order.retain(|w| *w != id);
        state.executions.retain(|e| e.workflow_id != id);
        Ok(true)
    }

    async fn create_execution(
        &self,
        workflow_id: Uuid,
        status: ExecutionStatus,
        started_at: Option<DateTime<Utc>>,
    ) -> Result<Execution, StoreError> {
        let mut state = self.state.write().await;
        if !state.workflows.contains_key(&workflow_id) {
            return Err(StoreError::NotFound);
        }

        let execution = Execution {
            id: Uuid::new_v4(),
            workflow_id,
            status,
            started_at,
            completed_at: None,
            execution_time: None,
            result: Value::Object(Map::new()),
            error_message: None,
            created_at: Utc::now(),
        };
        state.executions.push(execution.clone());
        Ok(execution)
    }

    async fn finish_execution(
        &self,
        id: Uuid,
        outcome: ExecutionOutcome,
    ) -> Result<Execution, StoreError> {
        let mut state = self.state.write().await;
        let execution = state
            .executions
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(StoreError::NotFound)?;
        if execution.status.is_terminal() {
            return Err(StoreError::Corrupt(format!("execution {id} is already {}", execution.status)));
        }

        execution.status = outcome.status;
        execution.completed_at = Some(outcome.completed_at);
        execution.execution_time = Some(outcome.execution_time);
        execution.result = outcome.result;
        execution.error_message = outcome.error_message;
        Ok(execution.clone())
    }

    async fn list_executions(
        &self,
        workflow_id: Uuid,
        skip: u32,
        limit: u32,
    ) -> Result<Page<Execution>, StoreError> {
        let state = self.state.read().await;
        let matching = state
            .executions
            .iter()
            .rev()
            .filter(|e| e.workflow_id == workflow_id)
            .cloned();
        Ok(page(matching, skip, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewTask;
    use serde_json::json;

    fn draft(name: &str, tasks: Vec<NewTask>) -> NewWorkflow {
        NewWorkflow {
            name: name.into(),
            description: None,
            configuration: json!({}),
            is_active: true,
            tasks,
        }
    }

    fn task(name: &str, order_index: i32) -> NewTask {
        NewTask {
            name: name.into(),
            task_type: "transform".into(),
            configuration: json!({}),
            order_index,
        }
    }

    #[tokio::test]
    async fn other_owners_see_nothing() {
        let store = MemoryStore::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let wf = store.create_workflow(alice, draft("a", vec![])).await.unwrap();

        assert!(store.get_workflow(wf.id, alice).await.unwrap().is_some());
        assert!(store.get_workflow(wf.id, bob).await.unwrap().is_none());
        assert!(store
            .update_workflow(wf.id, bob, WorkflowUpdate::default())
            .await
            .unwrap()
            .is_none());
        assert!(!store.delete_workflow(wf.id, bob).await.unwrap());
        assert!(store.load_workflow(wf.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn tasks_are_kept_in_stable_order_index_order() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let wf = store
            .create_workflow(owner, draft("a", vec![task("c", 2), task("a", 0), task("b", 0)]))
            .await
            .unwrap();

        let names: Vec<_> = wf.tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn list_is_newest_first_with_filter_and_total() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        for name in ["one", "two", "three"] {
            store.create_workflow(owner, draft(name, vec![])).await.unwrap();
        }
        let mut inactive = draft("off", vec![]);
        inactive.is_active = false;
        store.create_workflow(owner, inactive).await.unwrap();

        let filter = WorkflowFilter { is_active: Some(true), skip: 1, limit: 1 };
        let page = store.list_workflows(owner, filter).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "two");
    }

    #[tokio::test]
    async fn update_applies_only_supplied_fields() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let wf = store.create_workflow(owner, draft("before", vec![])).await.unwrap();

        let update = WorkflowUpdate { is_active: Some(false), ..Default::default() };
        let updated = store.update_workflow(wf.id, owner, update).await.unwrap().unwrap();

        assert_eq!(updated.name, "before");
        assert!(!updated.is_active);
        assert!(updated.updated_at >= wf.updated_at);
    }

    #[tokio::test]
    async fn delete_cascades_to_executions() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let wf = store.create_workflow(owner, draft("a", vec![])).await.unwrap();
        store
            .create_execution(wf.id, ExecutionStatus::Running, Some(Utc::now()))
            .await
            .unwrap();

        assert!(store.delete_workflow(wf.id, owner).await.unwrap());
        assert_eq!(store.list_executions(wf.id, 0, 50).await.unwrap().total, 0);
        assert!(store.get_workflow(wf.id, owner).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn execution_requires_existing_workflow() {
        let store = MemoryStore::new();
        let err = store
            .create_execution(Uuid::new_v4(), ExecutionStatus::Running, None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn finished_execution_cannot_be_finished_again() {
        let store = MemoryStore::new();
        let wf = store.create_workflow(Uuid::new_v4(), draft("a", vec![])).await.unwrap();
        let execution = store
            .create_execution(wf.id, ExecutionStatus::Running, Some(Utc::now()))
            .await
            .unwrap();
        let outcome = ExecutionOutcome {
            status: ExecutionStatus::Completed,
            completed_at: Utc::now(),
            execution_time: 0,
            result: json!({}),
            error_message: None,
        };

        store.finish_execution(execution.id, outcome.clone()).await.unwrap();
        let err = store.finish_execution(execution.id, outcome).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }
}
