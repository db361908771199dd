//! `MockExecutor`: a test double for `TaskExecutor`.
//!
//! Useful in engine and API tests where the real executors would hit the
//! network or sleep.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};

use crate::{ExecutionContext, TaskError, TaskExecutor};

/// Behaviour injected into `MockExecutor` at construction time.
pub enum MockBehaviour {
    /// Return a specific JSON value.
    ReturnValue(Value),
    /// Return the task configuration unchanged.
    EchoConfig,
    /// Fail with a `TaskError::Failed`.
    Fail(String),
}

/// A mock executor that records every call it receives and returns a
/// programmer-specified result.
pub struct MockExecutor {
    pub behaviour: MockBehaviour,
    /// Snapshot of the context seen on each call (in call order).
    pub calls: Arc<Mutex<Vec<Value>>>,
}

impl MockExecutor {
    fn with_behaviour(behaviour: MockBehaviour) -> Self {
        Self {
            behaviour,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A mock that always succeeds with `value`.
    pub fn returning(value: Value) -> Self {
        Self::with_behaviour(MockBehaviour::ReturnValue(value))
    }

    /// A mock that returns each task's configuration as its result.
    pub fn echoing() -> Self {
        Self::with_behaviour(MockBehaviour::EchoConfig)
    }

    /// A mock that always raises an executor-level error.
    pub fn failing(msg: impl Into<String>) -> Self {
        Self::with_behaviour(MockBehaviour::Fail(msg.into()))
    }

    /// Number of times this executor has been invoked.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Context snapshots, in call order.
    pub fn seen_contexts(&self) -> Vec<Value> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskExecutor for MockExecutor {
    async fn execute(&self, config: &Value, ctx: &ExecutionContext) -> Result<Value, TaskError> {
        self.calls.lock().unwrap().push(ctx.clone().into_value());

        match &self.behaviour {
            MockBehaviour::ReturnValue(v) => Ok(v.clone()),
            MockBehaviour::EchoConfig => Ok(config.clone()),
            MockBehaviour::Fail(msg) => Err(TaskError::Failed(msg.clone())),
        }
    }
}
