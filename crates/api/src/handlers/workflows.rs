//! Workflow CRUD handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use engine::models::WorkflowFilter;
use engine::validate::{validate_new_workflow, validate_update};
use engine::{NewWorkflow, Workflow, WorkflowUpdate};

use super::pagination;
use crate::error::{AppError, AppResult};
use crate::extract::Owner;
use crate::state::AppState;

const DEFAULT_LIMIT: u32 = 100;
const MAX_LIMIT: u32 = 1000;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct WorkflowList {
    pub workflows: Vec<Workflow>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

/// POST /api/v1/workflows
pub async fn create(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Json(payload): Json<NewWorkflow>,
) -> AppResult<(StatusCode, Json<Workflow>)> {
    validate_new_workflow(&payload)?;
    let workflow = state.store.create_workflow(owner, payload).await?;
    tracing::info!(workflow_id = %workflow.id, tasks = workflow.tasks.len(), "workflow created");
    Ok((StatusCode::CREATED, Json(workflow)))
}

/// GET /api/v1/workflows
pub async fn list(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Query(params): Query<ListParams>,
) -> AppResult<Json<WorkflowList>> {
    let (skip, limit) = pagination(params.skip, params.limit, DEFAULT_LIMIT, MAX_LIMIT)?;
    let filter = WorkflowFilter { is_active: params.is_active, skip, limit };

    let page = state.store.list_workflows(owner, filter).await?;
    Ok(Json(WorkflowList {
        workflows: page.items,
        total: page.total,
        page: skip / limit + 1,
        page_size: limit,
    }))
}

/// GET /api/v1/workflows/:id
pub async fn get(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Workflow>> {
    state
        .store
        .get_workflow(id, owner)
        .await?
        .map(Json)
        .ok_or_else(AppError::workflow_not_found)
}

/// PUT /api/v1/workflows/:id
pub async fn update(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<Uuid>,
    Json(payload): Json<WorkflowUpdate>,
) -> AppResult<Json<Workflow>> {
    validate_update(&payload)?;
    state
        .store
        .update_workflow(id, owner, payload)
        .await?
        .map(Json)
        .ok_or_else(AppError::workflow_not_found)
}

/// DELETE /api/v1/workflows/:id
pub async fn delete(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if state.store.delete_workflow(id, owner).await? {
        tracing::info!(workflow_id = %id, "workflow deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::workflow_not_found())
    }
}
