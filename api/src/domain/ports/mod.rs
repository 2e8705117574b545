//! Domain ports (traits)
//!
//! Port traits define interfaces that the domain layer requires.
//! Adapters provide concrete implementations of these traits.

pub mod platform;
pub mod repositories;

pub use platform::{BackendFunctions, PlatformAuth};
pub use repositories::{
    BankTransactionRepository, CategorizationRuleRepository, DocumentationRepository,
    ElsterSubmissionRepository, LetterShipmentRepository, WhatsAppMessageRepository,
    WorkflowVersionRepository,
};
