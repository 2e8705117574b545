//! Anlage V handlers
//!
//! The wizard is stateless on the server: every response carries the draft,
//! and the client sends it back for the next step.

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;

use crate::domain::entities::{AnlageVDraft, ElsterSubmission, User};
use crate::error::AppError;
use crate::AppState;

/// Request body for running the whole wizard
#[derive(Debug, Deserialize)]
pub struct RunWizardRequest {
    pub building_id: String,
    pub tax_year: i32,
}

/// Request body for saving a finished wizard
#[derive(Debug, Deserialize)]
pub struct SaveSubmissionRequest {
    pub draft: AnlageVDraft,
}

/// POST /anlage-v/wizard
pub async fn run_wizard(
    State(state): State<AppState>,
    Json(request): Json<RunWizardRequest>,
) -> Result<Json<AnlageVDraft>, AppError> {
    let draft = state
        .anlage_v_service
        .run(&request.building_id, request.tax_year)
        .await?;
    Ok(Json(draft))
}

/// POST /anlage-v/wizard/step
///
/// Runs the draft's current step and returns the advanced draft.
pub async fn advance_wizard(
    State(state): State<AppState>,
    Json(draft): Json<AnlageVDraft>,
) -> Result<Json<AnlageVDraft>, AppError> {
    Ok(Json(state.anlage_v_service.advance(draft).await?))
}

/// POST /anlage-v/submissions
pub async fn save_submission(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<SaveSubmissionRequest>,
) -> Result<(StatusCode, Json<ElsterSubmission>), AppError> {
    let submission = state
        .anlage_v_service
        .save_submission(&request.draft, &user)
        .await?;
    Ok((StatusCode::CREATED, Json(submission)))
}
