//! Platform adapter for WorkflowVersionRepository
//!
//! Activation runs as a single backend function call so the outgoing and
//! incoming versions change together on the platform side.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::client::{parse_timestamp, PlatformClient};
use super::to_domain_error;
use crate::domain::entities::{
    ActivationPlan, NewWorkflowVersion, VersionId, VersionStatus, WorkflowVersion,
};
use crate::domain::ports::{BackendFunctions, WorkflowVersionRepository};
use crate::error::DomainError;

const ENTITY: &str = "WorkflowVersion";

/// Backend function applying an activation plan atomically
pub const ACTIVATE_FUNCTION: &str = "activateWorkflowVersion";

/// Platform implementation of WorkflowVersionRepository
pub struct PlatformWorkflowVersionRepository {
    platform: Arc<PlatformClient>,
}

impl PlatformWorkflowVersionRepository {
    pub fn new(platform: Arc<PlatformClient>) -> Self {
        Self { platform }
    }
}

/// Version record as stored on the platform
#[derive(Debug, Deserialize)]
struct VersionRecord {
    id: String,
    workflow_id: String,
    #[serde(default)]
    version_number: i32,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    changelog: Option<String>,
    #[serde(default)]
    definition: serde_json::Value,
    #[serde(default)]
    activated_at: Option<String>,
    #[serde(default)]
    archived_at: Option<String>,
    #[serde(default)]
    created_date: Option<String>,
}

#[derive(Serialize)]
struct CreateVersionRequest<'a> {
    workflow_id: &'a str,
    version_number: i32,
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    changelog: Option<&'a str>,
    definition: &'a serde_json::Value,
}

#[derive(Serialize)]
struct ActivateRequest<'a> {
    workflow_id: &'a str,
    version_id: &'a str,
    /// The function rejects with 409 if the active set differs
    expected_active_version_ids: Vec<&'a str>,
    transition_strategy: String,
}

#[derive(Deserialize)]
struct ActivateResponse {
    activated: VersionRecord,
}

#[async_trait]
impl WorkflowVersionRepository for PlatformWorkflowVersionRepository {
    async fn find_by_id(&self, id: &VersionId) -> Result<Option<WorkflowVersion>, DomainError> {
        let record: Option<VersionRecord> = self
            .platform
            .get_entity(ENTITY, &id.0)
            .await
            .map_err(to_domain_error)?;

        Ok(record.map(Into::into))
    }

    async fn find_by_workflow(
        &self,
        workflow_id: &str,
    ) -> Result<Vec<WorkflowVersion>, DomainError> {
        let records: Vec<VersionRecord> = self
            .platform
            .filter_entities(
                ENTITY,
                &serde_json::json!({ "workflow_id": workflow_id }),
                Some("-version_number"),
            )
            .await
            .map_err(to_domain_error)?;

        Ok(records.into_iter().map(Into::into).collect())
    }

    async fn create(&self, version: &NewWorkflowVersion) -> Result<WorkflowVersion, DomainError> {
        let request = CreateVersionRequest {
            workflow_id: &version.workflow_id,
            version_number: version.version_number,
            status: "draft",
            changelog: version.changelog.as_deref(),
            definition: &version.definition,
        };

        let record: VersionRecord = self
            .platform
            .create_entity(ENTITY, &request)
            .await
            .map_err(to_domain_error)?;

        Ok(record.into())
    }

    async fn apply_activation(
        &self,
        plan: &ActivationPlan,
    ) -> Result<WorkflowVersion, DomainError> {
        let request = ActivateRequest {
            workflow_id: &plan.workflow_id,
            version_id: &plan.activate.0,
            expected_active_version_ids: plan.archive.iter().map(|id| id.0.as_str()).collect(),
            transition_strategy: plan.strategy.to_string(),
        };
        let payload = serde_json::to_value(&request)
            .map_err(|e| DomainError::Internal(format!("Failed to encode activation: {}", e)))?;

        let response = self
            .platform
            .invoke(ACTIVATE_FUNCTION, payload)
            .await
            .map_err(to_domain_error)?;

        let response: ActivateResponse = serde_json::from_value(response).map_err(|e| {
            DomainError::Storage(format!("Unexpected {} response: {}", ACTIVATE_FUNCTION, e))
        })?;

        Ok(response.activated.into())
    }

    async fn archive(&self, id: &VersionId) -> Result<WorkflowVersion, DomainError> {
        let record: VersionRecord = self
            .platform
            .update_entity(
                ENTITY,
                &id.0,
                &serde_json::json!({
                    "status": VersionStatus::Archived.to_string(),
                    "archived_at": Utc::now().to_rfc3339(),
                }),
            )
            .await
            .map_err(to_domain_error)?;

        Ok(record.into())
    }
}

/// Convert platform record to domain entity
impl From<VersionRecord> for WorkflowVersion {
    fn from(record: VersionRecord) -> Self {
        WorkflowVersion {
            id: VersionId(record.id),
            workflow_id: record.workflow_id,
            version_number: record.version_number,
            status: record
                .status
                .and_then(|s| s.parse().ok())
                .unwrap_or(VersionStatus::Draft),
            changelog: record.changelog,
            definition: record.definition,
            activated_at: record.activated_at.as_deref().and_then(parse_timestamp),
            archived_at: record.archived_at.as_deref().and_then(parse_timestamp),
            created_at: record.created_date.as_deref().and_then(parse_timestamp),
        }
    }
}
