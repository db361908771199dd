use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use api::{build_app_router, AppState, ServerConfig};
use engine::{Dispatcher, MemoryStore, WorkflowExecutor};
use executors::mock::MockExecutor;
use executors::ExecutorRegistry;
use queue::MemoryQueue;

pub struct TestApp {
    pub router: Router,
    pub queue: Arc<MemoryQueue>,
    pub executor: Arc<WorkflowExecutor>,
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        app_name: "workflowd-test".into(),
        environment: "test".into(),
        host: "127.0.0.1".into(),
        port: 0,
        ..Default::default()
    }
}

/// The production router over an in-memory store and queue. Besides the
/// built-ins, the registry has an echoing `mock` type.
pub fn build_test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let queue = Arc::new(MemoryQueue::new());

    let mut registry = ExecutorRegistry::with_builtins();
    registry.register("mock", Arc::new(MockExecutor::echoing()));
    let executor = Arc::new(WorkflowExecutor::new(store.clone(), Arc::new(registry)));

    let state = AppState {
        store,
        dispatcher: Dispatcher::new(executor.clone(), queue.clone()),
        config: Arc::new(test_config()),
    };

    TestApp { router: build_app_router(state), queue, executor }
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    owner: Option<Uuid>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(owner) = owner {
        builder = builder.header("x-user-id", owner.to_string());
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };
    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a workflow as the default owner and return its JSON.
pub async fn create_workflow(app: &Router, body: Value) -> Value {
    let response = post_json(app, "/api/v1/workflows", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}
