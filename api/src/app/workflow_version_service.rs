//! Workflow version service
//!
//! Versions move `draft -> active -> archived`. A workflow has at most one
//! active version; activating a draft archives the previous one in the same
//! transition.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::entities::{
    next_version_number, ActivationPlan, NewWorkflowVersion, TransitionStrategy, VersionId,
    VersionStatus, WorkflowVersion,
};
use crate::domain::ports::WorkflowVersionRepository;
use crate::error::{AppError, DomainError};

/// Service for workflow version lifecycle
pub struct WorkflowVersionService<VR>
where
    VR: WorkflowVersionRepository + ?Sized,
{
    versions: Arc<VR>,
    /// One lock per workflow; activations of the same workflow run one at a time
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<VR> WorkflowVersionService<VR>
where
    VR: WorkflowVersionRepository + ?Sized,
{
    pub fn new(versions: Arc<VR>) -> Self {
        Self {
            versions,
            locks: Mutex::new(HashMap::new()),
        }
    }

    async fn workflow_lock(&self, workflow_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        // Entries nobody holds or waits on are only referenced by the map
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks
            .entry(workflow_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn find_version(&self, id: &VersionId) -> Result<WorkflowVersion, AppError> {
        self.versions
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Workflow version {} not found", id)))
    }

    /// Create a new draft numbered after the highest existing version
    pub async fn create_draft(
        &self,
        workflow_id: &str,
        definition: serde_json::Value,
        changelog: Option<String>,
    ) -> Result<WorkflowVersion, AppError> {
        if workflow_id.trim().is_empty() {
            return Err(AppError::BadRequest(
                "workflow_id must not be empty".to_string(),
            ));
        }

        let lock = self.workflow_lock(workflow_id).await;
        let _guard = lock.lock().await;

        let existing = self.versions.find_by_workflow(workflow_id).await?;
        let version = NewWorkflowVersion {
            workflow_id: workflow_id.to_string(),
            version_number: next_version_number(&existing),
            changelog,
            definition,
        };

        let created = self.versions.create(&version).await?;
        tracing::info!(
            workflow_id,
            version_number = created.version_number,
            "Created workflow draft"
        );
        Ok(created)
    }

    /// Activate a draft, archiving the currently active version
    pub async fn activate(
        &self,
        id: &VersionId,
        strategy: TransitionStrategy,
    ) -> Result<WorkflowVersion, AppError> {
        let version = self.find_version(id).await?;

        let lock = self.workflow_lock(&version.workflow_id).await;
        let _guard = lock.lock().await;

        let versions = self.versions.find_by_workflow(&version.workflow_id).await?;
        let plan = ActivationPlan::build(&versions, id, strategy)
            .map_err(|e| AppError::Domain(DomainError::Conflict(e)))?;

        let activated = self.versions.apply_activation(&plan).await?;
        tracing::info!(
            workflow_id = %activated.workflow_id,
            version_number = activated.version_number,
            archived = plan.archive.len(),
            strategy = %plan.strategy,
            "Activated workflow version"
        );
        Ok(activated)
    }

    /// Archive a draft or active version
    pub async fn archive(&self, id: &VersionId) -> Result<WorkflowVersion, AppError> {
        let version = self.find_version(id).await?;

        let lock = self.workflow_lock(&version.workflow_id).await;
        let _guard = lock.lock().await;

        // Re-read under the lock; an activation may have archived it meanwhile
        let version = self.find_version(id).await?;
        if !version.can_archive() {
            return Err(AppError::Domain(DomainError::Conflict(format!(
                "Version {} is already archived",
                version.version_number
            ))));
        }

        Ok(self.versions.archive(id).await?)
    }

    /// All versions of a workflow, newest first
    pub async fn list(&self, workflow_id: &str) -> Result<Vec<WorkflowVersion>, AppError> {
        let mut versions = self.versions.find_by_workflow(workflow_id).await?;
        versions.sort_by(|a, b| b.version_number.cmp(&a.version_number));
        Ok(versions)
    }

    pub async fn active_version(
        &self,
        workflow_id: &str,
    ) -> Result<Option<WorkflowVersion>, AppError> {
        let versions = self.versions.find_by_workflow(workflow_id).await?;
        Ok(versions
            .into_iter()
            .find(|v| v.status == VersionStatus::Active))
    }
}
