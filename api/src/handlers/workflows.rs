//! Workflow version handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::domain::entities::{TransitionStrategy, VersionId, WorkflowVersion};
use crate::error::AppError;
use crate::AppState;

/// Request body for creating a draft version
#[derive(Debug, Deserialize)]
pub struct CreateVersionRequest {
    pub definition: serde_json::Value,
    #[serde(default)]
    pub changelog: Option<String>,
}

/// Request body for activating a version
#[derive(Debug, Default, Deserialize)]
pub struct ActivateVersionRequest {
    /// What happens to executions running on the outgoing version
    #[serde(default)]
    pub transition_strategy: TransitionStrategy,
}

/// GET /workflows/:workflow_id/versions
pub async fn list_versions(
    State(state): State<AppState>,
    Path(workflow_id): Path<String>,
) -> Result<Json<Vec<WorkflowVersion>>, AppError> {
    Ok(Json(state.workflow_service.list(&workflow_id).await?))
}

/// POST /workflows/:workflow_id/versions
pub async fn create_version(
    State(state): State<AppState>,
    Path(workflow_id): Path<String>,
    Json(request): Json<CreateVersionRequest>,
) -> Result<(StatusCode, Json<WorkflowVersion>), AppError> {
    let version = state
        .workflow_service
        .create_draft(&workflow_id, request.definition, request.changelog)
        .await?;
    Ok((StatusCode::CREATED, Json(version)))
}

/// GET /workflows/:workflow_id/versions/active
pub async fn get_active_version(
    State(state): State<AppState>,
    Path(workflow_id): Path<String>,
) -> Result<Json<WorkflowVersion>, AppError> {
    state
        .workflow_service
        .active_version(&workflow_id)
        .await?
        .map(Json)
        .ok_or_else(|| {
            AppError::NotFound(format!("Workflow {} has no active version", workflow_id))
        })
}

/// POST /workflow-versions/:id/activate
pub async fn activate_version(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ActivateVersionRequest>,
) -> Result<Json<WorkflowVersion>, AppError> {
    let version = state
        .workflow_service
        .activate(&VersionId(id), request.transition_strategy)
        .await?;
    Ok(Json(version))
}

/// POST /workflow-versions/:id/archive
pub async fn archive_version(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WorkflowVersion>, AppError> {
    Ok(Json(state.workflow_service.archive(&VersionId(id)).await?))
}
