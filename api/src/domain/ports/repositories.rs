//! Repository port traits
//!
//! These traits define the interface for data persistence.
//! Records live on the backend platform; adapters translate to its entity API.

use async_trait::async_trait;

use crate::domain::entities::{
    ActivationPlan, BankTransaction, CategorizationRule, DocumentationId, ElsterSubmission,
    GeneratedDocumentation, LetterShipment, NewCategorizationRule, NewDocumentation,
    NewElsterSubmission, NewLetterShipment, NewWhatsAppMessage, NewWorkflowVersion, RuleId,
    TransactionId, VersionId, WhatsAppMessage, WorkflowVersion,
};
use crate::error::DomainError;

/// Repository for categorization rules
#[async_trait]
pub trait CategorizationRuleRepository: Send + Sync {
    /// All rules in list order
    async fn list(&self) -> Result<Vec<CategorizationRule>, DomainError>;

    /// Active rules in list order
    async fn find_active(&self) -> Result<Vec<CategorizationRule>, DomainError>;

    /// Find a rule by ID
    async fn find_by_id(&self, id: &RuleId) -> Result<Option<CategorizationRule>, DomainError>;

    /// Create a new rule
    async fn create(&self, rule: &NewCategorizationRule)
        -> Result<CategorizationRule, DomainError>;

    /// Enable or disable a rule
    async fn set_active(
        &self,
        id: &RuleId,
        is_active: bool,
    ) -> Result<CategorizationRule, DomainError>;

    /// Store `match_count + 1` for a rule the caller just matched
    async fn increment_match_count(
        &self,
        rule: &CategorizationRule,
    ) -> Result<CategorizationRule, DomainError>;

    /// Delete a rule
    async fn delete(&self, id: &RuleId) -> Result<(), DomainError>;
}

/// Repository for imported bank transactions
#[async_trait]
pub trait BankTransactionRepository: Send + Sync {
    /// Find a transaction by ID
    async fn find_by_id(&self, id: &TransactionId)
        -> Result<Option<BankTransaction>, DomainError>;

    /// Transactions without a category
    async fn find_uncategorized(&self) -> Result<Vec<BankTransaction>, DomainError>;

    /// Set the category and mark the transaction categorized
    async fn set_category(
        &self,
        id: &TransactionId,
        category: &str,
    ) -> Result<BankTransaction, DomainError>;
}

/// Repository for workflow versions
#[async_trait]
pub trait WorkflowVersionRepository: Send + Sync {
    /// Find a version by ID
    async fn find_by_id(&self, id: &VersionId) -> Result<Option<WorkflowVersion>, DomainError>;

    /// All versions of a workflow
    async fn find_by_workflow(&self, workflow_id: &str)
        -> Result<Vec<WorkflowVersion>, DomainError>;

    /// Create a draft version
    async fn create(&self, version: &NewWorkflowVersion) -> Result<WorkflowVersion, DomainError>;

    /// Apply an activation as one transition; returns the activated version.
    ///
    /// Fails with `Conflict` when the active set no longer matches `plan.archive`.
    async fn apply_activation(&self, plan: &ActivationPlan)
        -> Result<WorkflowVersion, DomainError>;

    /// Archive a draft or active version
    async fn archive(&self, id: &VersionId) -> Result<WorkflowVersion, DomainError>;
}

/// Repository for generated documentation
#[async_trait]
pub trait DocumentationRepository: Send + Sync {
    /// Store a report
    async fn create(&self, doc: &NewDocumentation) -> Result<GeneratedDocumentation, DomainError>;

    /// Find a report by ID
    async fn find_by_id(
        &self,
        id: &DocumentationId,
    ) -> Result<Option<GeneratedDocumentation>, DomainError>;
}

/// Repository for ELSTER submissions
#[async_trait]
pub trait ElsterSubmissionRepository: Send + Sync {
    async fn create(
        &self,
        submission: &NewElsterSubmission,
    ) -> Result<ElsterSubmission, DomainError>;
}

/// Repository for postal letter records
#[async_trait]
pub trait LetterShipmentRepository: Send + Sync {
    async fn create(&self, shipment: &NewLetterShipment) -> Result<LetterShipment, DomainError>;
}

/// Repository for WhatsApp message records
#[async_trait]
pub trait WhatsAppMessageRepository: Send + Sync {
    async fn create(&self, message: &NewWhatsAppMessage)
        -> Result<WhatsAppMessage, DomainError>;

    /// Find a message by its WhatsApp id (webhooks redeliver)
    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<WhatsAppMessage>, DomainError>;
}
