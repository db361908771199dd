//! `transform` executor: reshapes a value taken from the context.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::traits::parse_config;
use crate::{ExecutionContext, TaskError, TaskExecutor};

const DEFAULT_TARGET_FIELD: &str = "result";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransformConfig {
    /// `uppercase`, `lowercase` or `extract`; anything else passes through.
    #[serde(default)]
    pub operation: Option<String>,
    /// Context key to read. A missing key reads as an empty map.
    #[serde(default)]
    pub source_field: Option<String>,
    /// Result key to write, `result` by default.
    #[serde(default)]
    pub target_field: Option<String>,
    /// Key pulled out of the source map by `extract`.
    #[serde(default)]
    pub extract_key: Option<String>,
}

pub struct TransformExecutor;

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn apply(operation: Option<&str>, source: Value, extract_key: Option<&str>) -> Result<Value, String> {
    match (operation, source) {
        (Some("uppercase"), Value::String(s)) => Ok(Value::String(s.to_uppercase())),
        (Some("lowercase"), Value::String(s)) => Ok(Value::String(s.to_lowercase())),
        (Some(op @ ("uppercase" | "lowercase")), other) => {
            Err(format!("operation '{op}' expects a string, got {}", kind_of(&other)))
        }
        (Some("extract"), Value::Object(mut map)) => Ok(match extract_key {
            Some(key) => map.remove(key).unwrap_or(Value::Null),
            None => Value::Object(map),
        }),
        (Some("extract"), other) => {
            Err(format!("operation 'extract' expects an object, got {}", kind_of(&other)))
        }
        (_, source) => Ok(source),
    }
}

#[async_trait]
impl TaskExecutor for TransformExecutor {
    async fn execute(&self, config: &Value, ctx: &ExecutionContext) -> Result<Value, TaskError> {
        let config: TransformConfig = parse_config(config)?;
        let operation = config.operation.as_deref();

        info!("Executing transformation: {}", operation.unwrap_or("<passthrough>"));

        let source = config
            .source_field
            .as_deref()
            .and_then(|field| ctx.get(field))
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        let target = config
            .target_field
            .as_deref()
            .filter(|field| !field.is_empty())
            .unwrap_or(DEFAULT_TARGET_FIELD);

        let mut result = Map::new();
        match apply(operation, source, config.extract_key.as_deref()) {
            Ok(value) => {
                result.insert("success".to_owned(), Value::Bool(true));
                result.insert(target.to_owned(), value);
            }
            Err(message) => {
                warn!("Transformation failed: {}", message);
                result.insert("success".to_owned(), Value::Bool(false));
                result.insert("error".to_owned(), Value::String(message));
            }
        }
        Ok(Value::Object(result))
    }
}
