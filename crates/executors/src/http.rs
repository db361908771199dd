//! `http_request` executor.
//!
//! Issues one HTTP call per task. Transport failures (refused connection,
//! timeout, DNS) never escape as errors: they are retried up to
//! `retry_count` times with exponential back-off and, if still failing,
//! reported as a result with `"success": false` and an `error` string.
//! Non-2xx responses are ordinary results and are not retried.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{error, info, warn};

use crate::traits::parse_config;
use crate::{ExecutionContext, TaskError, TaskExecutor};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const MIN_TIMEOUT_SECS: u64 = 1;
pub const MAX_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_RETRY_COUNT: u32 = 3;
pub const MAX_RETRY_COUNT: u32 = 10;

/// Base delay for exponential back-off between transport retries.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Declared configuration of an `http_request` task.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpRequestConfig {
    pub url: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<Value>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Extra attempts after a transport failure.
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
}

fn default_method() -> String {
    "GET".to_owned()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_retry_count() -> u32 {
    DEFAULT_RETRY_COUNT
}

impl HttpRequestConfig {
    /// The request timeout, clamped to `1..=300` seconds.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS))
    }

    /// The retry budget, capped at [`MAX_RETRY_COUNT`].
    pub fn retries(&self) -> u32 {
        self.retry_count.min(MAX_RETRY_COUNT)
    }

    /// A body is only sent when it carries something; `{}` and `null` do not.
    fn json_body(&self) -> Option<&Value> {
        self.body.as_ref().filter(|body| match body {
            Value::Null => false,
            Value::Object(map) => !map.is_empty(),
            Value::Array(items) => !items.is_empty(),
            _ => true,
        })
    }
}

// ---------------------------------------------------------------------------
// HttpRequestExecutor
// ---------------------------------------------------------------------------

pub struct HttpRequestExecutor {
    client: reqwest::Client,
    retry_base_delay: Duration,
}

impl HttpRequestExecutor {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            retry_base_delay: RETRY_BASE_DELAY,
        }
    }

    /// Override the back-off base delay (tests use a tiny one).
    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    async fn send_once(
        &self,
        config: &HttpRequestConfig,
        method: &Method,
    ) -> Result<Value, reqwest::Error> {
        let mut request = self
            .client
            .request(method.clone(), &config.url)
            .timeout(config.timeout());

        if let Some(headers) = &config.headers {
            for (name, value) in headers {
                request = request.header(name, value);
            }
        }
        if let Some(body) = config.json_body() {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let headers: Map<String, Value> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned()),
                )
            })
            .collect();
        let body = response.text().await?;

        Ok(json!({
            "status_code": status.as_u16(),
            "headers": headers,
            "body": body,
            "success": status.is_success(),
        }))
    }
}

impl Default for HttpRequestExecutor {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[async_trait]
impl TaskExecutor for HttpRequestExecutor {
    async fn execute(&self, config: &Value, _ctx: &ExecutionContext) -> Result<Value, TaskError> {
        let config: HttpRequestConfig = parse_config(config)?;
        let method_name = config.method.to_uppercase();

        info!("Executing HTTP {} request to {}", method_name, config.url);

        let method = match Method::from_bytes(method_name.as_bytes()) {
            Ok(method) => method,
            Err(_) => {
                error!("HTTP request failed: invalid method '{}'", config.method);
                return Ok(json!({
                    "success": false,
                    "error": format!("invalid HTTP method '{}'", config.method),
                }));
            }
        };

        let retries = config.retries();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            match self.send_once(&config, &method).await {
                Ok(mut result) => {
                    result["attempts"] = json!(attempts);
                    return Ok(result);
                }
                // A request that could not even be built will not improve on retry.
                Err(err) if err.is_builder() || attempts > retries => {
                    error!("HTTP request failed after {} attempt(s): {}", attempts, err);
                    return Ok(json!({
                        "success": false,
                        "error": err.to_string(),
                        "attempts": attempts,
                    }));
                }
                Err(err) => {
                    let delay = self.retry_base_delay * 2u32.pow(attempts - 1);
                    warn!(
                        "HTTP request transport error (attempt {}/{}), retrying in {:?}: {}",
                        attempts,
                        retries + 1,
                        delay,
                        err
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use std::net::SocketAddr;

    async fn spawn_server() -> SocketAddr {
        let app = Router::new()
            .route("/ok", get(|| async { "hello" }))
            .route("/missing", get(|| async { (StatusCode::NOT_FOUND, "nope") }))
            .route("/echo", post(|Json(body): Json<Value>| async move { Json(body) }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    /// An address nothing listens on.
    async fn closed_addr() -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    }

    fn executor() -> HttpRequestExecutor {
        HttpRequestExecutor::default().with_retry_base_delay(Duration::from_millis(1))
    }

    #[test]
    fn config_defaults_and_clamping() {
        let cfg: HttpRequestConfig =
            serde_json::from_value(json!({ "url": "http://x", "timeout": 900, "retry_count": 50 }))
                .unwrap();
        assert_eq!(cfg.method, "GET");
        assert_eq!(cfg.timeout(), Duration::from_secs(MAX_TIMEOUT_SECS));
        assert_eq!(cfg.retries(), MAX_RETRY_COUNT);

        let cfg: HttpRequestConfig =
            serde_json::from_value(json!({ "url": "http://x", "timeout": 0 })).unwrap();
        assert_eq!(cfg.timeout(), Duration::from_secs(MIN_TIMEOUT_SECS));
        assert_eq!(cfg.retries(), DEFAULT_RETRY_COUNT);
    }

    #[tokio::test]
    async fn status_200_is_success() {
        let addr = spawn_server().await;
        let ctx = ExecutionContext::new(json!({}));

        let result = executor()
            .execute(&json!({ "url": format!("http://{addr}/ok") }), &ctx)
            .await
            .unwrap();

        assert_eq!(result["success"], true);
        assert_eq!(result["status_code"], 200);
        assert_eq!(result["body"], "hello");
        assert_eq!(result["attempts"], 1);
        assert!(result["headers"].is_object());
    }

    #[tokio::test]
    async fn status_404_is_failure_with_status_code() {
        let addr = spawn_server().await;
        let ctx = ExecutionContext::new(json!({}));

        let result = executor()
            .execute(&json!({ "url": format!("http://{addr}/missing") }), &ctx)
            .await
            .unwrap();

        assert_eq!(result["success"], false);
        assert_eq!(result["status_code"], 404);
        // Non-2xx responses are not retried.
        assert_eq!(result["attempts"], 1);
    }

    #[tokio::test]
    async fn json_body_is_sent_with_lowercase_method() {
        let addr = spawn_server().await;
        let ctx = ExecutionContext::new(json!({}));

        let result = executor()
            .execute(
                &json!({
                    "url": format!("http://{addr}/echo"),
                    "method": "post",
                    "body": { "greeting": "hi" },
                }),
                &ctx,
            )
            .await
            .unwrap();

        assert_eq!(result["success"], true);
        let echoed: Value = serde_json::from_str(result["body"].as_str().unwrap()).unwrap();
        assert_eq!(echoed, json!({ "greeting": "hi" }));
    }

    #[tokio::test]
    async fn connection_refused_is_caught_and_retried() {
        let addr = closed_addr().await;
        let ctx = ExecutionContext::new(json!({}));

        let result = executor()
            .execute(
                &json!({ "url": format!("http://{addr}/"), "retry_count": 2, "timeout": 2 }),
                &ctx,
            )
            .await
            .expect("transport failures must not propagate");

        assert_eq!(result["success"], false);
        assert!(result["error"].as_str().is_some());
        assert_eq!(result["attempts"], 3);
    }

    #[tokio::test]
    async fn invalid_method_is_a_failed_result() {
        let ctx = ExecutionContext::new(json!({}));
        let result = executor()
            .execute(&json!({ "url": "http://127.0.0.1:1/", "method": "BAD METHOD" }), &ctx)
            .await
            .unwrap();
        assert_eq!(result["success"], false);
    }

    #[tokio::test]
    async fn missing_url_is_a_config_error() {
        let ctx = ExecutionContext::new(json!({}));
        let err = executor().execute(&json!({}), &ctx).await.unwrap_err();
        assert!(matches!(err, TaskError::InvalidConfig(_)));
    }
}
