//! Application router builder, shared by the binary and the tests.

use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::extract::USER_ID_HEADER;
use crate::handlers::{executions, health, workflows};
use crate::state::AppState;

/// The `/api/v1/workflows` route tree.
///
/// ```text
/// /                     GET list, POST create
/// /:id                  GET, PUT, DELETE
/// /:id/execute          POST
/// /:id/executions       GET
/// ```
fn workflow_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(workflows::list).post(workflows::create))
        .route(
            "/:id",
            get(workflows::get).put(workflows::update).delete(workflows::delete),
        )
        .route("/:id/execute", post(executions::execute))
        .route("/:id/executions", get(executions::list))
}

/// Build the full application [`Router`] with tracing and CORS layers.
pub fn build_app_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config);

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .nest("/api/v1/workflows", workflow_routes())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Invalid origins are logged and skipped. `*` is skipped as well: a
/// wildcard cannot be combined with credentials.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter(|o| {
            let wildcard = o.as_str() == "*";
            if wildcard {
                tracing::warn!("ignoring wildcard CORS origin");
            }
            !wildcard
        })
        .filter_map(|o| match o.parse() {
            Ok(origin) => Some(origin),
            Err(e) => {
                tracing::warn!(origin = %o, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION, HeaderName::from_static(USER_ID_HEADER)])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_origin_does_not_panic_with_credentials() {
        let config = ServerConfig {
            cors_origins: vec!["*".into(), "http://localhost:3000".into()],
            ..Default::default()
        };
        let _layer = build_cors_layer(&config);
    }
}
