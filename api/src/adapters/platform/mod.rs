//! Platform adapters
//!
//! The platform is the source of truth for every record; these adapters
//! implement the repository ports over its entity API.

pub mod client;
pub mod communication_repo;
pub mod documentation_repo;
pub mod elster_submission_repo;
pub mod rule_repo;
pub mod transaction_repo;
pub mod workflow_version_repo;

pub use client::PlatformClient;
pub use communication_repo::{PlatformLetterShipmentRepository, PlatformWhatsAppMessageRepository};
pub use documentation_repo::PlatformDocumentationRepository;
pub use elster_submission_repo::PlatformElsterSubmissionRepository;
pub use rule_repo::PlatformRuleRepository;
pub use transaction_repo::PlatformTransactionRepository;
pub use workflow_version_repo::PlatformWorkflowVersionRepository;

use crate::error::{DomainError, PlatformError};

/// Map a platform failure onto the domain's error vocabulary
pub(crate) fn to_domain_error(e: PlatformError) -> DomainError {
    match e {
        PlatformError::EntityNotFound { .. } | PlatformError::Api { status: 404, .. } => {
            DomainError::NotFound(e.to_string())
        }
        PlatformError::Api { status: 409, .. } | PlatformError::FunctionFailed { status: 409, .. } => {
            DomainError::Conflict(e.to_string())
        }
        PlatformError::Api { status: 422, .. } | PlatformError::FunctionFailed { status: 422, .. } => {
            DomainError::Validation(e.to_string())
        }
        other => DomainError::Platform(other),
    }
}
