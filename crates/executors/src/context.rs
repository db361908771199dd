//! The execution context threaded through a single workflow run.

use serde_json::{Map, Value};

/// Key under which the caller-supplied input is seeded.
pub const INPUT_KEY: &str = "input";

/// Ephemeral key-value map shared by every task of one run.
///
/// Seeded with `input`; after each task the engine stores that task's result
/// under the task's name, so later tasks can read earlier outputs by name.
/// A later task with the same name overwrites the earlier entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionContext {
    values: Map<String, Value>,
}

impl ExecutionContext {
    /// Create a context seeded with `{"input": input}`.
    pub fn new(input: Value) -> Self {
        let mut values = Map::new();
        values.insert(INPUT_KEY.to_owned(), input);
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Bind `value` under `key`, returning the previous binding if any.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(key.into(), value)
    }

    /// The context as a variable namespace (used by expression evaluation).
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_context_is_seeded_with_input() {
        let ctx = ExecutionContext::new(json!({ "name": "abc" }));
        assert_eq!(ctx.len(), 1);
        assert_eq!(ctx.get("input"), Some(&json!({ "name": "abc" })));
    }

    #[test]
    fn insert_overwrites_existing_key() {
        let mut ctx = ExecutionContext::new(json!({}));
        assert!(ctx.insert("step", json!(1)).is_none());
        assert_eq!(ctx.insert("step", json!(2)), Some(json!(1)));
        assert_eq!(ctx.into_value(), json!({ "input": {}, "step": 2 }));
    }
}
