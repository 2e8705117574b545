//! Documentation service
//!
//! Generates the static project reports and stores them on the platform.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;

use crate::domain::entities::{
    DocumentationId, DocumentationType, GeneratedDocumentation, NewDocumentation, User,
};
use crate::domain::ports::DocumentationRepository;
use crate::error::AppError;
use crate::reports;

/// Service for generated documentation
pub struct DocumentationService<DR>
where
    DR: DocumentationRepository + ?Sized,
{
    docs: Arc<DR>,
}

impl<DR> DocumentationService<DR>
where
    DR: DocumentationRepository + ?Sized,
{
    pub fn new(docs: Arc<DR>) -> Self {
        Self { docs }
    }

    /// Render a report and persist it on behalf of `user`
    pub async fn generate(
        &self,
        kind: DocumentationType,
        user: &User,
    ) -> Result<GeneratedDocumentation, AppError> {
        let started = Instant::now();
        let content_markdown = reports::render(kind, Utc::now().date_naive());
        let generation_duration_seconds = started.elapsed().as_secs_f64();

        let doc = NewDocumentation {
            documentation_type: kind,
            title: kind.title().to_string(),
            description: Some(format!("Automatisch erstellt von {}", user.display_name())),
            file_size_bytes: content_markdown.len() as u64,
            content_markdown,
            generation_duration_seconds,
            created_by: user.email.clone(),
        };

        let stored = self.docs.create(&doc).await?;
        tracing::info!(
            documentation_id = %stored.id,
            documentation_type = %kind,
            file_size_bytes = stored.file_size_bytes,
            "Generated documentation"
        );
        Ok(stored)
    }

    pub async fn get(&self, id: &DocumentationId) -> Result<GeneratedDocumentation, AppError> {
        self.docs
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Documentation {} not found", id)))
    }
}
