//! ELSTER submission entity
//!
//! A saved Anlage V form awaiting transmission to the tax authority.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Platform id of a submission
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub String);

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Submission status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    /// Saved with open critical errors
    Draft,
    /// Passed validation, ready to transmit
    Validated,
    Submitted,
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionStatus::Draft => write!(f, "draft"),
            SubmissionStatus::Validated => write!(f, "validated"),
            SubmissionStatus::Submitted => write!(f, "submitted"),
        }
    }
}

impl std::str::FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(SubmissionStatus::Draft),
            "validated" => Ok(SubmissionStatus::Validated),
            "submitted" => Ok(SubmissionStatus::Submitted),
            _ => Err(format!("Unknown submission status: {}", s)),
        }
    }
}

/// A stored ELSTER submission
#[derive(Debug, Clone, Serialize)]
pub struct ElsterSubmission {
    pub id: SubmissionId,
    pub building_id: String,
    pub tax_year: i32,
    pub form_type: String,
    pub status: SubmissionStatus,
    pub form_data: serde_json::Value,
    pub validation_errors: Vec<String>,
    pub created_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Data needed to store a submission
#[derive(Debug, Clone)]
pub struct NewElsterSubmission {
    pub building_id: String,
    pub tax_year: i32,
    pub status: SubmissionStatus,
    pub form_data: serde_json::Value,
    pub validation_errors: Vec<String>,
    pub created_by: String,
}
