//! Platform adapter for ElsterSubmissionRepository

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::client::{parse_timestamp, PlatformClient};
use super::to_domain_error;
use crate::domain::entities::{
    ElsterSubmission, NewElsterSubmission, SubmissionId, SubmissionStatus,
};
use crate::domain::ports::ElsterSubmissionRepository;
use crate::error::DomainError;

const ENTITY: &str = "ElsterSubmission";
const FORM_TYPE: &str = "anlage_v";

/// Platform implementation of ElsterSubmissionRepository
pub struct PlatformElsterSubmissionRepository {
    platform: Arc<PlatformClient>,
}

impl PlatformElsterSubmissionRepository {
    pub fn new(platform: Arc<PlatformClient>) -> Self {
        Self { platform }
    }
}

#[derive(Debug, Deserialize)]
struct SubmissionRecord {
    id: String,
    building_id: String,
    tax_year: i32,
    #[serde(default)]
    form_type: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    form_data: serde_json::Value,
    #[serde(default)]
    validation_errors: Vec<String>,
    #[serde(default)]
    created_by: Option<String>,
    #[serde(default)]
    created_date: Option<String>,
}

#[derive(Serialize)]
struct CreateSubmissionRequest<'a> {
    building_id: &'a str,
    tax_year: i32,
    form_type: &'a str,
    status: String,
    form_data: &'a serde_json::Value,
    validation_errors: &'a [String],
    created_by: &'a str,
}

#[async_trait]
impl ElsterSubmissionRepository for PlatformElsterSubmissionRepository {
    async fn create(
        &self,
        submission: &NewElsterSubmission,
    ) -> Result<ElsterSubmission, DomainError> {
        let request = CreateSubmissionRequest {
            building_id: &submission.building_id,
            tax_year: submission.tax_year,
            form_type: FORM_TYPE,
            status: submission.status.to_string(),
            form_data: &submission.form_data,
            validation_errors: &submission.validation_errors,
            created_by: &submission.created_by,
        };

        let record: SubmissionRecord = self
            .platform
            .create_entity(ENTITY, &request)
            .await
            .map_err(to_domain_error)?;

        Ok(record.into())
    }
}

impl From<SubmissionRecord> for ElsterSubmission {
    fn from(record: SubmissionRecord) -> Self {
        ElsterSubmission {
            id: SubmissionId(record.id),
            building_id: record.building_id,
            tax_year: record.tax_year,
            form_type: record.form_type.unwrap_or_else(|| FORM_TYPE.to_string()),
            status: record
                .status
                .and_then(|s| s.parse().ok())
                .unwrap_or(SubmissionStatus::Draft),
            form_data: record.form_data,
            validation_errors: record.validation_errors,
            created_by: record.created_by,
            created_at: record.created_date.as_deref().and_then(parse_timestamp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_defaults_to_anlage_v_draft() {
        let record: SubmissionRecord = serde_json::from_value(serde_json::json!({
            "id": "s1",
            "building_id": "b-1",
            "tax_year": 2024
        }))
        .unwrap();

        let submission: ElsterSubmission = record.into();
        assert_eq!(submission.form_type, "anlage_v");
        assert_eq!(submission.status, SubmissionStatus::Draft);
        assert!(submission.validation_errors.is_empty());
    }
}
