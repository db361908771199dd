//! Executor registry: maps task type tags to `TaskExecutor` implementations.

use std::collections::HashMap;
use std::sync::Arc;

use crate::conditional::ConditionalExecutor;
use crate::database::DatabaseExecutor;
use crate::email::EmailExecutor;
use crate::http::HttpRequestExecutor;
use crate::transform::TransformExecutor;
use crate::{TaskExecutor, TaskKind, UnsupportedTaskType};

/// Explicit tag → executor map. No runtime discovery: an executor exists for
/// a tag only if it was registered.
#[derive(Clone, Default)]
pub struct ExecutorRegistry {
    executors: HashMap<String, Arc<dyn TaskExecutor>>,
}

impl ExecutorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in executor.
    pub fn with_builtins() -> Self {
        Self::with_http_client(reqwest::Client::new())
    }

    /// Built-ins, with the `http_request` executor sharing `client`.
    pub fn with_http_client(client: reqwest::Client) -> Self {
        let mut registry = Self::new();
        for kind in TaskKind::ALL {
            let executor: Arc<dyn TaskExecutor> = match kind {
                TaskKind::HttpRequest => Arc::new(HttpRequestExecutor::new(client.clone())),
                TaskKind::Email => Arc::new(EmailExecutor::new()),
                TaskKind::Database => Arc::new(DatabaseExecutor::new()),
                TaskKind::Transform => Arc::new(TransformExecutor),
                TaskKind::Conditional => Arc::new(ConditionalExecutor),
            };
            registry.register(kind.as_str(), executor);
        }
        registry
    }

    /// Bind `executor` to `tag`, returning whatever was bound before.
    pub fn register(
        &mut self,
        tag: impl Into<String>,
        executor: Arc<dyn TaskExecutor>,
    ) -> Option<Arc<dyn TaskExecutor>> {
        self.executors.insert(tag.into(), executor)
    }

    /// Look up the executor for `tag`.
    ///
    /// # Errors
    /// [`UnsupportedTaskType`] if nothing is registered under `tag`.
    pub fn get(&self, tag: &str) -> Result<Arc<dyn TaskExecutor>, UnsupportedTaskType> {
        self.executors
            .get(tag)
            .cloned()
            .ok_or_else(|| UnsupportedTaskType(tag.to_owned()))
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.executors.contains_key(tag)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.executors.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

impl std::fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutorRegistry").field("tags", &self.tags()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockExecutor;
    use serde_json::json;

    #[test]
    fn builtins_cover_every_task_kind() {
        let registry = ExecutorRegistry::with_builtins();
        assert_eq!(
            registry.tags(),
            vec!["conditional", "database", "email", "http_request", "transform"]
        );
    }

    #[test]
    fn unknown_tag_is_unsupported() {
        let registry = ExecutorRegistry::with_builtins();
        let err = registry.get("sms").err().expect("sms is not built in");
        assert_eq!(err, UnsupportedTaskType("sms".to_owned()));
        assert_eq!(err.to_string(), "Unsupported task type: sms");
    }

    #[test]
    fn register_replaces_existing_binding() {
        let mut registry = ExecutorRegistry::with_builtins();
        let previous = registry.register("email", Arc::new(MockExecutor::returning(json!({}))));
        assert!(previous.is_some());
        assert!(registry.contains("email"));

        assert!(registry.register("sms", Arc::new(MockExecutor::returning(json!({})))).is_none());
        assert!(registry.get("sms").is_ok());
    }
}
