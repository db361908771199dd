//! `conditional` executor.
//!
//! Evaluates `condition` against the context and reports which of the two
//! declared task lists is selected. The selection is informational only: the
//! engine runs every task of the workflow in order regardless of the outcome.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::expr;
use crate::traits::parse_config;
use crate::{ExecutionContext, TaskError, TaskExecutor};

#[derive(Debug, Clone, Deserialize)]
pub struct ConditionalConfig {
    pub condition: String,
    #[serde(default)]
    pub true_tasks: Vec<String>,
    #[serde(default)]
    pub false_tasks: Vec<String>,
}

pub struct ConditionalExecutor;

#[async_trait]
impl TaskExecutor for ConditionalExecutor {
    async fn execute(&self, config: &Value, ctx: &ExecutionContext) -> Result<Value, TaskError> {
        let config: ConditionalConfig = parse_config(config)?;

        info!("Evaluating condition: {}", config.condition);

        match expr::evaluate_bool(&config.condition, ctx.as_map()) {
            Ok(met) => Ok(json!({
                "success": true,
                "condition_met": met,
                "true_tasks": if met { config.true_tasks } else { Vec::new() },
                "false_tasks": if met { Vec::new() } else { config.false_tasks },
            })),
            Err(err) => {
                warn!("Condition evaluation failed: {}", err);
                Ok(json!({ "success": false, "error": err.to_string() }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ExecutionContext {
        ExecutionContext::new(json!({ "amount": 250 }))
    }

    #[tokio::test]
    async fn selects_true_branch() {
        let result = ConditionalExecutor
            .execute(
                &json!({
                    "condition": "input.amount > 100",
                    "true_tasks": ["approve"],
                    "false_tasks": ["reject"],
                }),
                &ctx(),
            )
            .await
            .unwrap();

        assert_eq!(
            result,
            json!({
                "success": true,
                "condition_met": true,
                "true_tasks": ["approve"],
                "false_tasks": [],
            })
        );
    }

    #[tokio::test]
    async fn selects_false_branch() {
        let result = ConditionalExecutor
            .execute(
                &json!({
                    "condition": "input.amount > 1000",
                    "true_tasks": ["approve"],
                    "false_tasks": ["reject"],
                }),
                &ctx(),
            )
            .await
            .unwrap();

        assert_eq!(result["condition_met"], false);
        assert_eq!(result["true_tasks"], json!([]));
        assert_eq!(result["false_tasks"], json!(["reject"]));
    }

    #[tokio::test]
    async fn evaluation_error_is_a_failed_result() {
        let result = ConditionalExecutor
            .execute(&json!({ "condition": "missing.amount > 1" }), &ctx())
            .await
            .unwrap();

        assert_eq!(result["success"], false);
        assert!(result["error"].as_str().is_some());
    }

    #[tokio::test]
    async fn missing_condition_is_a_config_error() {
        let err = ConditionalExecutor.execute(&json!({}), &ctx()).await.unwrap_err();
        assert!(matches!(err, TaskError::InvalidConfig(_)));
    }
}
