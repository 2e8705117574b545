//! Workflow version domain entity
//!
//! Versions move `draft -> active -> archived`. At most one version per
//! workflow is active; activation is planned here and applied by the
//! repository as a single transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Platform id of a workflow version
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionId(pub String);

impl std::fmt::Display for VersionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a workflow version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionStatus {
    Draft,
    Active,
    Archived,
}

impl std::fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VersionStatus::Draft => write!(f, "draft"),
            VersionStatus::Active => write!(f, "active"),
            VersionStatus::Archived => write!(f, "archived"),
        }
    }
}

impl std::str::FromStr for VersionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(VersionStatus::Draft),
            "active" => Ok(VersionStatus::Active),
            "archived" => Ok(VersionStatus::Archived),
            _ => Err(format!("Unknown version status: {}", s)),
        }
    }
}

/// What happens to executions still running on the outgoing version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransitionStrategy {
    #[default]
    CompleteOnCurrent,
    MigrateToNew,
}

impl std::fmt::Display for TransitionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionStrategy::CompleteOnCurrent => write!(f, "complete_on_current"),
            TransitionStrategy::MigrateToNew => write!(f, "migrate_to_new"),
        }
    }
}

impl std::str::FromStr for TransitionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "complete_on_current" => Ok(TransitionStrategy::CompleteOnCurrent),
            "migrate_to_new" => Ok(TransitionStrategy::MigrateToNew),
            _ => Err(format!("Unknown transition strategy: {}", s)),
        }
    }
}

/// A versioned workflow definition
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowVersion {
    pub id: VersionId,
    pub workflow_id: String,
    pub version_number: i32,
    pub status: VersionStatus,
    pub changelog: Option<String>,
    /// Opaque definition interpreted by the execution engine
    pub definition: serde_json::Value,
    pub activated_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl WorkflowVersion {
    pub fn can_activate(&self) -> bool {
        self.status == VersionStatus::Draft
    }

    pub fn can_archive(&self) -> bool {
        self.status != VersionStatus::Archived
    }
}

/// Data needed to create a new draft version
#[derive(Debug, Clone)]
pub struct NewWorkflowVersion {
    pub workflow_id: String,
    pub version_number: i32,
    pub changelog: Option<String>,
    pub definition: serde_json::Value,
}

/// Next version number for a workflow
pub fn next_version_number(versions: &[WorkflowVersion]) -> i32 {
    versions
        .iter()
        .map(|v| v.version_number)
        .max()
        .unwrap_or(0)
        + 1
}

/// The complete effect of activating one version, applied in one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivationPlan {
    pub workflow_id: String,
    pub activate: VersionId,
    /// Versions that are active right now and get archived by this transition
    pub archive: Vec<VersionId>,
    pub strategy: TransitionStrategy,
}

impl ActivationPlan {
    /// Plan activating `target` given the workflow's current versions
    pub fn build(
        versions: &[WorkflowVersion],
        target: &VersionId,
        strategy: TransitionStrategy,
    ) -> Result<Self, String> {
        let version = versions
            .iter()
            .find(|v| &v.id == target)
            .ok_or_else(|| format!("Version {} does not belong to this workflow", target))?;

        if !version.can_activate() {
            return Err(format!(
                "Version {} is {} and cannot be activated; only drafts can",
                version.version_number, version.status
            ));
        }

        let archive = versions
            .iter()
            .filter(|v| v.status == VersionStatus::Active)
            .map(|v| v.id.clone())
            .collect();

        Ok(Self {
            workflow_id: version.workflow_id.clone(),
            activate: target.clone(),
            archive,
            strategy,
        })
    }
}
