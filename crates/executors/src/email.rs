//! `email` executor.
//!
//! Placeholder: no mail is delivered. The executor waits a fixed latency to
//! stand in for a provider round-trip and always reports success. Wire a
//! real transport in before relying on this for notifications.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::traits::parse_config;
use crate::{ExecutionContext, TaskError, TaskExecutor};

const SIMULATED_LATENCY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub cc: Option<String>,
    #[serde(default)]
    pub bcc: Option<String>,
    /// Whether `body` is HTML.
    #[serde(default)]
    pub html: bool,
}

pub struct EmailExecutor {
    latency: Duration,
}

impl EmailExecutor {
    pub fn new() -> Self {
        Self::with_latency(SIMULATED_LATENCY)
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for EmailExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskExecutor for EmailExecutor {
    async fn execute(&self, config: &Value, _ctx: &ExecutionContext) -> Result<Value, TaskError> {
        let config: EmailConfig = parse_config(config)?;

        info!(
            to = config.to.as_deref().unwrap_or_default(),
            html = config.html,
            "Sending email with subject: {}",
            config.subject.as_deref().unwrap_or_default()
        );

        tokio::time::sleep(self.latency).await;

        Ok(json!({
            "success": true,
            "to": config.to,
            "subject": config.subject,
            "message": "Email sent successfully (simulated)",
        }))
    }
}
