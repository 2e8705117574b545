//! Documentation handlers
//!
//! Endpoints generating the static project reports.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;

use crate::domain::entities::{DocumentationId, DocumentationType, GeneratedDocumentation, User};
use crate::error::AppError;
use crate::AppState;

/// Response body of the generate endpoints
#[derive(Debug, Serialize)]
pub struct GenerateDocumentationResponse {
    pub success: bool,
    pub documentation_id: String,
    /// UTF-8 byte length of the Markdown
    pub file_size_bytes: u64,
    pub generation_duration_seconds: f64,
}

impl From<GeneratedDocumentation> for GenerateDocumentationResponse {
    fn from(doc: GeneratedDocumentation) -> Self {
        Self {
            success: true,
            documentation_id: doc.id.0,
            file_size_bytes: doc.file_size_bytes,
            generation_duration_seconds: doc.generation_duration_seconds,
        }
    }
}

async fn generate(
    state: &AppState,
    kind: DocumentationType,
    user: &User,
) -> Result<Json<GenerateDocumentationResponse>, AppError> {
    let doc = state.documentation_service.generate(kind, user).await?;
    Ok(Json(doc.into()))
}

/// POST /functions/generateRoadmapDocumentation
pub async fn generate_roadmap_documentation(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<GenerateDocumentationResponse>, AppError> {
    generate(&state, DocumentationType::Roadmap, &user).await
}

/// POST /functions/generateTestingDocumentation
pub async fn generate_testing_documentation(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<GenerateDocumentationResponse>, AppError> {
    generate(&state, DocumentationType::Testing, &user).await
}

/// POST /functions/generateTimelineDocumentation
pub async fn generate_timeline_documentation(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<GenerateDocumentationResponse>, AppError> {
    generate(&state, DocumentationType::Timeline, &user).await
}

/// GET /documentation/:id
pub async fn get_documentation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GeneratedDocumentation>, AppError> {
    let doc = state
        .documentation_service
        .get(&DocumentationId(id))
        .await?;
    Ok(Json(doc))
}
