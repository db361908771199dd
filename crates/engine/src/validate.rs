//! Structural validation: run this before persisting a workflow.
//!
//! Rules enforced:
//! 1. Workflow and task names are 1–255 characters.
//! 2. Every `order_index` is non-negative.
//!
//! Task type tags are deliberately *not* checked here: unknown tags are
//! storable and rejected by the registry at run time. [`check_task_types`]
//! is the opt-in check used by `workflowd validate`.

use executors::ExecutorRegistry;

use crate::models::{NewTask, NewWorkflow, WorkflowUpdate};
use crate::EngineError;

pub const MAX_NAME_LEN: usize = 255;

fn check_name(what: &str, name: &str) -> Result<(), EngineError> {
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_LEN {
        return Err(EngineError::InvalidWorkflow(format!(
            "{what} must be between 1 and {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate a workflow before creation.
///
/// # Errors
/// [`EngineError::InvalidWorkflow`] describing the first violation.
pub fn validate_new_workflow(workflow: &NewWorkflow) -> Result<(), EngineError> {
    check_name("workflow name", &workflow.name)?;

    for (i, task) in workflow.tasks.iter().enumerate() {
        check_name(&format!("tasks[{i}].name"), &task.name)?;
        if task.order_index < 0 {
            return Err(EngineError::InvalidWorkflow(format!(
                "tasks[{i}].order_index must be >= 0"
            )));
        }
    }

    Ok(())
}

/// Validate a partial update.
pub fn validate_update(update: &WorkflowUpdate) -> Result<(), EngineError> {
    match &update.name {
        Some(name) => check_name("workflow name", name),
        None => Ok(()),
    }
}

/// Check every task type against `registry` and return task names in
/// execution order.
///
/// # Errors
/// [`EngineError::UnsupportedTaskType`] for the first unknown tag.
pub fn check_task_types(
    tasks: &[NewTask],
    registry: &ExecutorRegistry,
) -> Result<Vec<String>, EngineError> {
    let mut ordered: Vec<&NewTask> = tasks.iter().collect();
    ordered.sort_by_key(|t| t.order_index);

    ordered
        .into_iter()
        .map(|task| {
            if registry.contains(&task.task_type) {
                Ok(task.name.clone())
            } else {
                Err(EngineError::UnsupportedTaskType {
                    task: task.name.clone(),
                    task_type: task.task_type.clone(),
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn task(name: &str, task_type: &str, order_index: i32) -> NewTask {
        NewTask {
            name: name.into(),
            task_type: task_type.into(),
            configuration: json!({}),
            order_index,
        }
    }

    fn workflow(name: &str, tasks: Vec<NewTask>) -> NewWorkflow {
        NewWorkflow {
            name: name.into(),
            description: None,
            configuration: json!({}),
            is_active: true,
            tasks,
        }
    }

    #[test]
    fn accepts_well_formed_workflow() {
        let wf = workflow("nightly", vec![task("fetch", "http_request", 0), task("shout", "sms", 3)]);
        assert!(validate_new_workflow(&wf).is_ok());
    }

    #[test]
    fn rejects_empty_and_overlong_names() {
        assert!(validate_new_workflow(&workflow("", vec![])).is_err());
        assert!(validate_new_workflow(&workflow(&"x".repeat(256), vec![])).is_err());
        assert!(validate_new_workflow(&workflow(&"x".repeat(255), vec![])).is_ok());

        let err = validate_new_workflow(&workflow("ok", vec![task("", "email", 0)])).unwrap_err();
        assert!(err.to_string().contains("tasks[0].name"));
    }

    #[test]
    fn rejects_negative_order_index() {
        let err = validate_new_workflow(&workflow("ok", vec![task("a", "email", -1)])).unwrap_err();
        assert!(matches!(err, EngineError::InvalidWorkflow(_)));
    }

    #[test]
    fn update_only_checks_supplied_name() {
        assert!(validate_update(&WorkflowUpdate::default()).is_ok());
        let update = WorkflowUpdate { name: Some(String::new()), ..Default::default() };
        assert!(validate_update(&update).is_err());
    }

    #[test]
    fn type_check_reports_unknown_tag_and_orders_names() {
        let registry = ExecutorRegistry::with_builtins();

        let names = check_task_types(&[task("b", "email", 2), task("a", "transform", 1)], &registry)
            .unwrap();
        assert_eq!(names, ["a", "b"]);

        let err = check_task_types(&[task("a", "sms", 0)], &registry).unwrap_err();
        assert!(err.to_string().contains("sms"));
    }
}
