//! The `TaskExecutor` trait: the contract every task type must fulfil.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{ExecutionContext, TaskError};

/// The core executor trait.
///
/// Implementations receive the task's own configuration map and a read-only
/// view of the context as mutated by the tasks that ran before it.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Run the task and return its JSON result.
    ///
    /// Results conventionally carry a boolean `success` field.
    async fn execute(&self, config: &Value, ctx: &ExecutionContext) -> Result<Value, TaskError>;
}

/// Deserialize a task configuration, treating `null` as an empty map.
pub(crate) fn parse_config<T: DeserializeOwned>(config: &Value) -> Result<T, TaskError> {
    let config = match config {
        Value::Null => Value::Object(Map::new()),
        other => other.clone(),
    };
    Ok(serde_json::from_value(config)?)
}
