//! `database` executor.
//!
//! Placeholder: no query is issued. It simulates latency and echoes the
//! requested operation and table back as a successful result.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::traits::parse_config;
use crate::{ExecutionContext, TaskError, TaskExecutor};

const SIMULATED_LATENCY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    /// `select`, `insert`, `update` or `delete`.
    #[serde(default)]
    pub operation: Option<String>,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub conditions: Option<Value>,
}

pub struct DatabaseExecutor {
    latency: Duration,
}

impl DatabaseExecutor {
    pub fn new() -> Self {
        Self::with_latency(SIMULATED_LATENCY)
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for DatabaseExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskExecutor for DatabaseExecutor {
    async fn execute(&self, config: &Value, _ctx: &ExecutionContext) -> Result<Value, TaskError> {
        let config: DatabaseConfig = parse_config(config)?;

        info!(
            "Executing database {} on table {}",
            config.operation.as_deref().unwrap_or("<none>"),
            config.table.as_deref().unwrap_or("<none>")
        );

        tokio::time::sleep(self.latency).await;

        Ok(json!({
            "success": true,
            "operation": config.operation,
            "table": config.table,
            "message": "Database operation completed (simulated)",
        }))
    }
}
