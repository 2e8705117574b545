//! Domain entities
//!
//! Pure domain models for the records this service reads and writes.
//! The platform owns persistence; these types carry only the fields we use.

pub mod anlage_v;
pub mod categorization;
pub mod communication;
pub mod documentation;
pub mod elster_submission;
pub mod user;
pub mod workflow_version;

pub use anlage_v::{
    net_income, AnlageVDraft, BuildingData, CostSummary, IncomeSummary, ValidationIssue,
    ValidationReport, WizardStep,
};
pub use categorization::{
    find_matching_rule, BankTransaction, CategorizationRule, NewCategorizationRule, RuleId,
    RuleSuggestion, TransactionId,
};
pub use communication::{
    normalize_phone_number, DeliveryStatus, LetterShipment, MessageDirection, NewLetterShipment,
    NewWhatsAppMessage, ShippingType, WhatsAppMessage,
};
pub use documentation::{
    DocumentationId, DocumentationType, GeneratedDocumentation, NewDocumentation,
};
pub use elster_submission::{
    ElsterSubmission, NewElsterSubmission, SubmissionId, SubmissionStatus,
};
pub use user::{User, UserId, UserRole};
pub use workflow_version::{
    next_version_number, ActivationPlan, NewWorkflowVersion, TransitionStrategy, VersionId,
    VersionStatus, WorkflowVersion,
};
