//! `api` crate: HTTP REST API layer.
//!
//! Exposes:
//!   GET    /health, /
//!   POST   /api/v1/workflows
//!   GET    /api/v1/workflows
//!   GET    /api/v1/workflows/:id
//!   PUT    /api/v1/workflows/:id
//!   DELETE /api/v1/workflows/:id
//!   POST   /api/v1/workflows/:id/execute
//!   GET    /api/v1/workflows/:id/executions

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod state;

use std::future::Future;

use tokio::net::TcpListener;

pub use config::ServerConfig;
pub use router::build_app_router;
pub use state::AppState;

/// Serve the API on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "API server listening");
    }
    axum::serve(listener, build_app_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
