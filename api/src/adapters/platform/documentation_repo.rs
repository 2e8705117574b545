//! Platform adapter for DocumentationRepository

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::client::{parse_timestamp, PlatformClient};
use super::to_domain_error;
use crate::domain::entities::{DocumentationId, GeneratedDocumentation, NewDocumentation};
use crate::domain::ports::DocumentationRepository;
use crate::error::DomainError;

const ENTITY: &str = "GeneratedDocumentation";

/// Status stored with every report; generation is synchronous
pub const STATUS_COMPLETED: &str = "completed";

/// Platform implementation of DocumentationRepository
pub struct PlatformDocumentationRepository {
    platform: Arc<PlatformClient>,
}

impl PlatformDocumentationRepository {
    pub fn new(platform: Arc<PlatformClient>) -> Self {
        Self { platform }
    }
}

#[derive(Debug, Deserialize)]
struct DocumentationRecord {
    id: String,
    documentation_type: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    content_markdown: String,
    #[serde(default)]
    file_size_bytes: u64,
    #[serde(default)]
    generation_duration_seconds: f64,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    created_by: Option<String>,
    #[serde(default)]
    created_date: Option<String>,
}

#[derive(Serialize)]
struct CreateDocumentationRequest<'a> {
    documentation_type: String,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    content_markdown: &'a str,
    file_size_bytes: u64,
    generation_duration_seconds: f64,
    status: &'a str,
    created_by: &'a str,
}

#[async_trait]
impl DocumentationRepository for PlatformDocumentationRepository {
    async fn create(&self, doc: &NewDocumentation) -> Result<GeneratedDocumentation, DomainError> {
        let request = CreateDocumentationRequest {
            documentation_type: doc.documentation_type.to_string(),
            title: &doc.title,
            description: doc.description.as_deref(),
            content_markdown: &doc.content_markdown,
            file_size_bytes: doc.file_size_bytes,
            generation_duration_seconds: doc.generation_duration_seconds,
            status: STATUS_COMPLETED,
            created_by: &doc.created_by,
        };

        let record: DocumentationRecord = self
            .platform
            .create_entity(ENTITY, &request)
            .await
            .map_err(to_domain_error)?;

        record.try_into()
    }

    async fn find_by_id(
        &self,
        id: &DocumentationId,
    ) -> Result<Option<GeneratedDocumentation>, DomainError> {
        let record: Option<DocumentationRecord> = self
            .platform
            .get_entity(ENTITY, &id.0)
            .await
            .map_err(to_domain_error)?;

        record.map(GeneratedDocumentation::try_from).transpose()
    }
}

impl TryFrom<DocumentationRecord> for GeneratedDocumentation {
    type Error = DomainError;

    fn try_from(record: DocumentationRecord) -> Result<Self, Self::Error> {
        let documentation_type = record
            .documentation_type
            .parse()
            .map_err(DomainError::Storage)?;

        Ok(GeneratedDocumentation {
            id: DocumentationId(record.id),
            documentation_type,
            title: record.title,
            description: record.description,
            content_markdown: record.content_markdown,
            file_size_bytes: record.file_size_bytes,
            generation_duration_seconds: record.generation_duration_seconds,
            status: record
                .status
                .unwrap_or_else(|| STATUS_COMPLETED.to_string()),
            created_by: record.created_by,
            created_at: record.created_date.as_deref().and_then(parse_timestamp),
        })
    }
}
