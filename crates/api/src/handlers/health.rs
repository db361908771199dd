use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `healthy`, or `degraded` when the store is unreachable.
    pub status: &'static str,
    pub app: String,
    pub version: &'static str,
    pub environment: String,
}

#[derive(Serialize)]
pub struct WelcomeResponse {
    pub message: String,
    pub version: &'static str,
    pub health: &'static str,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = match state.store.health_check().await {
        Ok(()) => "healthy",
        Err(e) => {
            tracing::warn!(error = %e, "store health check failed");
            "degraded"
        }
    };

    Json(HealthResponse {
        status,
        app: state.config.app_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
    })
}

/// GET /
pub async fn root(State(state): State<AppState>) -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: format!("Welcome to {}", state.config.app_name),
        version: env!("CARGO_PKG_VERSION"),
        health: "/health",
    })
}
