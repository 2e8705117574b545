//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain entities, ports, and the platform.

pub mod anlage_v_service;
pub mod categorization_service;
pub mod communication_service;
pub mod documentation_service;
pub mod workflow_version_service;

pub use anlage_v_service::AnlageVWizardService;
pub use categorization_service::{ApplyRulesSummary, CategorizationOutcome, CategorizationService};
pub use communication_service::{CommunicationService, InboundMessage, LetterRequest};
pub use documentation_service::DocumentationService;
pub use workflow_version_service::WorkflowVersionService;
