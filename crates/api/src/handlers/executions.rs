//! Execution handlers: trigger a run, read history.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use engine::Execution;

use super::pagination;
use crate::error::{AppError, AppResult};
use crate::extract::Owner;
use crate::state::AppState;

const DEFAULT_LIMIT: u32 = 50;
const MAX_LIMIT: u32 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct ExecuteParams {
    #[serde(default)]
    pub background: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExecuteRequest {
    #[serde(default)]
    pub input_data: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ExecutionList {
    pub executions: Vec<Execution>,
    pub total: u64,
}

/// POST /api/v1/workflows/:id/execute?background=bool
///
/// The body is optional; an empty body or a missing `input_data` runs with
/// `{}`. A body that is not a valid request is rejected before anything runs.
pub async fn execute(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<Uuid>,
    Query(params): Query<ExecuteParams>,
    body: Bytes,
) -> AppResult<Json<Execution>> {
    let request = parse_execute_body(&body)?;

    if state.store.get_workflow(id, owner).await?.is_none() {
        return Err(AppError::workflow_not_found());
    }

    let input = request.input_data.unwrap_or_else(|| Value::Object(Map::new()));
    let execution = state.dispatcher.dispatch(id, input, params.background).await?;
    Ok(Json(execution))
}

fn parse_execute_body(body: &[u8]) -> Result<ExecuteRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ExecuteRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))
}

/// GET /api/v1/workflows/:id/executions
///
/// A workflow the caller does not own yields an empty list, not a 404.
pub async fn list(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<Uuid>,
    Query(params): Query<HistoryParams>,
) -> AppResult<Json<ExecutionList>> {
    let (skip, limit) = pagination(params.skip, params.limit, DEFAULT_LIMIT, MAX_LIMIT)?;

    if state.store.get_workflow(id, owner).await?.is_none() {
        return Ok(Json(ExecutionList { executions: Vec::new(), total: 0 }));
    }

    let page = state.store.list_executions(id, skip, limit).await?;
    Ok(Json(ExecutionList { executions: page.items, total: page.total }))
}
