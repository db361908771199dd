use std::sync::Arc;

use engine::{Dispatcher, WorkflowStore};

use crate::config::ServerConfig;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn WorkflowStore>,
    pub dispatcher: Dispatcher,
    pub config: Arc<ServerConfig>,
}
