//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod platform;

pub use platform::{
    PlatformClient, PlatformDocumentationRepository, PlatformElsterSubmissionRepository,
    PlatformLetterShipmentRepository, PlatformRuleRepository, PlatformTransactionRepository,
    PlatformWhatsAppMessageRepository, PlatformWorkflowVersionRepository,
};
