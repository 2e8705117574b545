//! Categorization handlers
//!
//! Rule management and transaction categorization.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::app::{ApplyRulesSummary, CategorizationOutcome};
use crate::domain::entities::{CategorizationRule, NewCategorizationRule, RuleId, TransactionId};
use crate::error::AppError;
use crate::AppState;

fn default_true() -> bool {
    true
}

/// Request body for creating a rule
#[derive(Debug, Deserialize)]
pub struct CreateRuleRequest {
    /// Defaults to "<pattern> -> <category>"
    #[serde(default)]
    pub name: Option<String>,
    pub sender_receiver_contains: String,
    pub category: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Stored for display only; matching uses list order
    #[serde(default)]
    pub priority: i32,
}

impl From<CreateRuleRequest> for NewCategorizationRule {
    fn from(request: CreateRuleRequest) -> Self {
        let name = request.name.filter(|n| !n.trim().is_empty()).unwrap_or_else(|| {
            format!(
                "{} -> {}",
                request.sender_receiver_contains.trim(),
                request.category.trim()
            )
        });
        NewCategorizationRule {
            name,
            sender_receiver_contains: request.sender_receiver_contains.trim().to_string(),
            category: request.category.trim().to_string(),
            is_active: request.is_active,
            priority: request.priority,
        }
    }
}

/// Request body for toggling a rule
#[derive(Debug, Deserialize)]
pub struct UpdateRuleRequest {
    pub is_active: bool,
}

/// Request body for categorizing a transaction
#[derive(Debug, Default, Deserialize)]
pub struct CategorizeRequest {
    /// Falls back to the matching rule's category
    #[serde(default)]
    pub category: Option<String>,
    /// Create the suggested rule right away when nothing matched
    #[serde(default)]
    pub create_rule: bool,
}

#[derive(Debug, Serialize)]
pub struct RulePreviewResponse {
    pub transaction_id: String,
    pub matched_rule: Option<CategorizationRule>,
}

/// GET /categorization/rules
pub async fn list_rules(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategorizationRule>>, AppError> {
    Ok(Json(state.categorization_service.list_rules().await?))
}

/// POST /categorization/rules
pub async fn create_rule(
    State(state): State<AppState>,
    Json(request): Json<CreateRuleRequest>,
) -> Result<(StatusCode, Json<CategorizationRule>), AppError> {
    let rule = state
        .categorization_service
        .create_rule(request.into())
        .await?;
    Ok((StatusCode::CREATED, Json(rule)))
}

/// PATCH /categorization/rules/:id
pub async fn update_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateRuleRequest>,
) -> Result<Json<CategorizationRule>, AppError> {
    let rule = state
        .categorization_service
        .set_rule_active(&RuleId(id), request.is_active)
        .await?;
    Ok(Json(rule))
}

/// DELETE /categorization/rules/:id
pub async fn delete_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.categorization_service.delete_rule(&RuleId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /transactions/:id/rule-preview
pub async fn preview_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RulePreviewResponse>, AppError> {
    let matched_rule = state
        .categorization_service
        .preview(&TransactionId(id.clone()))
        .await?;
    Ok(Json(RulePreviewResponse {
        transaction_id: id,
        matched_rule,
    }))
}

/// POST /transactions/:id/categorize
pub async fn categorize_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CategorizeRequest>,
) -> Result<Json<CategorizationOutcome>, AppError> {
    let outcome = state
        .categorization_service
        .categorize(
            &TransactionId(id),
            request.category.as_deref(),
            request.create_rule,
        )
        .await?;
    Ok(Json(outcome))
}

/// POST /transactions/apply-rules
pub async fn apply_rules(
    State(state): State<AppState>,
) -> Result<Json<ApplyRulesSummary>, AppError> {
    Ok(Json(
        state
            .categorization_service
            .apply_rules_to_uncategorized()
            .await?,
    ))
}
