//! Mock implementations of port traits
//!
//! These are in-memory implementations that can be configured for testing.
//! They store data in memory and allow tests to verify behavior.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::domain::entities::{
    ActivationPlan, BankTransaction, CategorizationRule, DocumentationId, ElsterSubmission,
    GeneratedDocumentation, LetterShipment, NewCategorizationRule, NewDocumentation,
    NewElsterSubmission, NewLetterShipment, NewWhatsAppMessage, NewWorkflowVersion, RuleId,
    SubmissionId, TransactionId, User, VersionId, VersionStatus, WhatsAppMessage, WorkflowVersion,
};
use crate::domain::ports::{
    BackendFunctions, BankTransactionRepository, CategorizationRuleRepository,
    DocumentationRepository, ElsterSubmissionRepository, LetterShipmentRepository, PlatformAuth,
    WhatsAppMessageRepository, WorkflowVersionRepository,
};
use crate::error::{DomainError, PlatformError};

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ============================================================================
// Mock Platform Auth
// ============================================================================

/// Resolves tokens registered with `with_user`; everything else is unauthorized
#[derive(Default)]
pub struct MockPlatformAuth {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl MockPlatformAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, token: &str, user: User) -> Self {
        self.users
            .write()
            .unwrap()
            .insert(token.to_string(), user);
        self
    }
}

#[async_trait]
impl PlatformAuth for MockPlatformAuth {
    async fn me(&self, token: &str) -> Result<User, PlatformError> {
        self.users
            .read()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or(PlatformError::Unauthorized)
    }
}

// ============================================================================
// Mock Backend Functions
// ============================================================================

/// Returns canned responses per function name and records every call
#[derive(Default)]
pub struct MockBackendFunctions {
    responses: Arc<RwLock<HashMap<String, serde_json::Value>>>,
    failing: Arc<RwLock<HashMap<String, (u16, String)>>>,
    rate_limited: Arc<RwLock<HashSet<String>>>,
    calls: Arc<RwLock<Vec<(String, serde_json::Value)>>>,
}

impl MockBackendFunctions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to `function` with `response`
    pub fn with_response(self, function: &str, response: serde_json::Value) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(function.to_string(), response);
        self
    }

    /// Make `function` fail with the given status and message
    pub fn failing(self, function: &str, status: u16, message: &str) -> Self {
        self.failing
            .write()
            .unwrap()
            .insert(function.to_string(), (status, message.to_string()));
        self
    }

    /// Make `function` fail before it runs, as the platform does when throttling
    pub fn rate_limited(self, function: &str) -> Self {
        self.rate_limited
            .write()
            .unwrap()
            .insert(function.to_string());
        self
    }

    /// Names of the functions invoked so far, in call order
    pub fn called_functions(&self) -> Vec<String> {
        self.calls
            .read()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Payload of the most recent call to `function`
    pub fn last_payload(&self, function: &str) -> Option<serde_json::Value> {
        self.calls
            .read()
            .unwrap()
            .iter()
            .rev()
            .find(|(name, _)| name == function)
            .map(|(_, payload)| payload.clone())
    }
}

#[async_trait]
impl BackendFunctions for MockBackendFunctions {
    async fn invoke(
        &self,
        function: &str,
        payload: serde_json::Value,
    ) -> Result<serde_json::Value, PlatformError> {
        self.calls
            .write()
            .unwrap()
            .push((function.to_string(), payload));

        if self.rate_limited.read().unwrap().contains(function) {
            return Err(PlatformError::RateLimited);
        }

        if let Some((status, message)) = self.failing.read().unwrap().get(function) {
            return Err(PlatformError::FunctionFailed {
                function: function.to_string(),
                status: *status,
                message: message.clone(),
            });
        }

        Ok(self
            .responses
            .read()
            .unwrap()
            .get(function)
            .cloned()
            .unwrap_or_else(|| serde_json::json!({})))
    }
}

// ============================================================================
// In-Memory Categorization Rule Repository
// ============================================================================

/// Keeps rules in insertion order, which is the matching order
#[derive(Default)]
pub struct InMemoryRuleRepository {
    rules: Arc<RwLock<Vec<CategorizationRule>>>,
}

impl InMemoryRuleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a rule for testing
    pub fn with_rule(self, rule: CategorizationRule) -> Self {
        self.rules.write().unwrap().push(rule);
        self
    }

    pub fn get(&self, id: &str) -> Option<CategorizationRule> {
        self.rules
            .read()
            .unwrap()
            .iter()
            .find(|r| r.id.0 == id)
            .cloned()
    }

    pub fn count(&self) -> usize {
        self.rules.read().unwrap().len()
    }
}

#[async_trait]
impl CategorizationRuleRepository for InMemoryRuleRepository {
    async fn list(&self) -> Result<Vec<CategorizationRule>, DomainError> {
        Ok(self.rules.read().unwrap().clone())
    }

    async fn find_active(&self) -> Result<Vec<CategorizationRule>, DomainError> {
        Ok(self
            .rules
            .read()
            .unwrap()
            .iter()
            .filter(|r| r.is_active)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &RuleId) -> Result<Option<CategorizationRule>, DomainError> {
        Ok(self.get(&id.0))
    }

    async fn create(
        &self,
        rule: &NewCategorizationRule,
    ) -> Result<CategorizationRule, DomainError> {
        let created = CategorizationRule {
            id: RuleId(new_id()),
            name: rule.name.clone(),
            sender_receiver_contains: rule.sender_receiver_contains.clone(),
            category: rule.category.clone(),
            is_active: rule.is_active,
            priority: rule.priority,
            match_count: 0,
            created_at: Some(Utc::now()),
        };
        self.rules.write().unwrap().push(created.clone());
        Ok(created)
    }

    async fn set_active(
        &self,
        id: &RuleId,
        is_active: bool,
    ) -> Result<CategorizationRule, DomainError> {
        let mut rules = self.rules.write().unwrap();
        let rule = rules
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("CategorizationRule {}", id)))?;
        rule.is_active = is_active;
        Ok(rule.clone())
    }

    async fn increment_match_count(
        &self,
        rule: &CategorizationRule,
    ) -> Result<CategorizationRule, DomainError> {
        let mut rules = self.rules.write().unwrap();
        let stored = rules
            .iter_mut()
            .find(|r| r.id == rule.id)
            .ok_or_else(|| DomainError::NotFound(format!("CategorizationRule {}", rule.id)))?;
        stored.match_count = rule.match_count + 1;
        Ok(stored.clone())
    }

    async fn delete(&self, id: &RuleId) -> Result<(), DomainError> {
        let mut rules = self.rules.write().unwrap();
        let before = rules.len();
        rules.retain(|r| &r.id != id);
        if rules.len() == before {
            return Err(DomainError::NotFound(format!("CategorizationRule {}", id)));
        }
        Ok(())
    }
}

// ============================================================================
// In-Memory Bank Transaction Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryTransactionRepository {
    transactions: Arc<RwLock<HashMap<TransactionId, BankTransaction>>>,
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a transaction for testing
    pub fn with_transaction(self, transaction: BankTransaction) -> Self {
        self.transactions
            .write()
            .unwrap()
            .insert(transaction.id.clone(), transaction);
        self
    }

    pub fn get(&self, id: &str) -> Option<BankTransaction> {
        self.transactions
            .read()
            .unwrap()
            .get(&TransactionId(id.to_string()))
            .cloned()
    }
}

#[async_trait]
impl BankTransactionRepository for InMemoryTransactionRepository {
    async fn find_by_id(
        &self,
        id: &TransactionId,
    ) -> Result<Option<BankTransaction>, DomainError> {
        Ok(self.transactions.read().unwrap().get(id).cloned())
    }

    async fn find_uncategorized(&self) -> Result<Vec<BankTransaction>, DomainError> {
        let mut uncategorized: Vec<BankTransaction> = self
            .transactions
            .read()
            .unwrap()
            .values()
            .filter(|t| !t.is_categorized)
            .cloned()
            .collect();
        uncategorized.sort_by(|a, b| b.transaction_date.cmp(&a.transaction_date));
        Ok(uncategorized)
    }

    async fn set_category(
        &self,
        id: &TransactionId,
        category: &str,
    ) -> Result<BankTransaction, DomainError> {
        let mut transactions = self.transactions.write().unwrap();
        let transaction = transactions
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("BankTransaction {}", id)))?;
        transaction.category = Some(category.to_string());
        transaction.is_categorized = true;
        Ok(transaction.clone())
    }
}

// ============================================================================
// In-Memory Workflow Version Repository
// ============================================================================

/// Applies activation plans under a single write lock
#[derive(Default)]
pub struct InMemoryWorkflowVersionRepository {
    versions: Arc<RwLock<HashMap<VersionId, WorkflowVersion>>>,
}

impl InMemoryWorkflowVersionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a version for testing
    pub fn with_version(self, version: WorkflowVersion) -> Self {
        self.versions
            .write()
            .unwrap()
            .insert(version.id.clone(), version);
        self
    }

    pub fn get(&self, id: &str) -> Option<WorkflowVersion> {
        self.versions
            .read()
            .unwrap()
            .get(&VersionId(id.to_string()))
            .cloned()
    }

    /// Number of active versions of a workflow
    pub fn active_count(&self, workflow_id: &str) -> usize {
        self.versions
            .read()
            .unwrap()
            .values()
            .filter(|v| v.workflow_id == workflow_id && v.status == VersionStatus::Active)
            .count()
    }
}

#[async_trait]
impl WorkflowVersionRepository for InMemoryWorkflowVersionRepository {
    async fn find_by_id(&self, id: &VersionId) -> Result<Option<WorkflowVersion>, DomainError> {
        Ok(self.versions.read().unwrap().get(id).cloned())
    }

    async fn find_by_workflow(
        &self,
        workflow_id: &str,
    ) -> Result<Vec<WorkflowVersion>, DomainError> {
        Ok(self
            .versions
            .read()
            .unwrap()
            .values()
            .filter(|v| v.workflow_id == workflow_id)
            .cloned()
            .collect())
    }

    async fn create(&self, version: &NewWorkflowVersion) -> Result<WorkflowVersion, DomainError> {
        let created = WorkflowVersion {
            id: VersionId(new_id()),
            workflow_id: version.workflow_id.clone(),
            version_number: version.version_number,
            status: VersionStatus::Draft,
            changelog: version.changelog.clone(),
            definition: version.definition.clone(),
            activated_at: None,
            archived_at: None,
            created_at: Some(Utc::now()),
        };
        self.versions
            .write()
            .unwrap()
            .insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn apply_activation(
        &self,
        plan: &ActivationPlan,
    ) -> Result<WorkflowVersion, DomainError> {
        let mut versions = self.versions.write().unwrap();

        let active_now: HashSet<VersionId> = versions
            .values()
            .filter(|v| v.workflow_id == plan.workflow_id && v.status == VersionStatus::Active)
            .map(|v| v.id.clone())
            .collect();
        let expected: HashSet<VersionId> = plan.archive.iter().cloned().collect();
        if active_now != expected {
            return Err(DomainError::Conflict(
                "Active version changed since the activation was planned".to_string(),
            ));
        }

        match versions.get(&plan.activate) {
            Some(v) if v.status == VersionStatus::Draft => {}
            Some(_) => {
                return Err(DomainError::Conflict(
                    "Version is no longer a draft".to_string(),
                ))
            }
            None => {
                return Err(DomainError::NotFound(format!(
                    "WorkflowVersion {}",
                    plan.activate
                )))
            }
        }

        let now = Utc::now();
        for id in &plan.archive {
            if let Some(v) = versions.get_mut(id) {
                v.status = VersionStatus::Archived;
                v.archived_at = Some(now);
            }
        }

        let target = versions
            .get_mut(&plan.activate)
            .ok_or_else(|| DomainError::NotFound(format!("WorkflowVersion {}", plan.activate)))?;
        target.status = VersionStatus::Active;
        target.activated_at = Some(now);
        Ok(target.clone())
    }

    async fn archive(&self, id: &VersionId) -> Result<WorkflowVersion, DomainError> {
        let mut versions = self.versions.write().unwrap();
        let version = versions
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("WorkflowVersion {}", id)))?;
        version.status = VersionStatus::Archived;
        version.archived_at = Some(Utc::now());
        Ok(version.clone())
    }
}

// ============================================================================
// In-Memory Documentation Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryDocumentationRepository {
    docs: Arc<RwLock<HashMap<DocumentationId, GeneratedDocumentation>>>,
}

impl InMemoryDocumentationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.docs.read().unwrap().len()
    }
}

#[async_trait]
impl DocumentationRepository for InMemoryDocumentationRepository {
    async fn create(&self, doc: &NewDocumentation) -> Result<GeneratedDocumentation, DomainError> {
        let created = GeneratedDocumentation {
            id: DocumentationId(new_id()),
            documentation_type: doc.documentation_type,
            title: doc.title.clone(),
            description: doc.description.clone(),
            content_markdown: doc.content_markdown.clone(),
            file_size_bytes: doc.file_size_bytes,
            generation_duration_seconds: doc.generation_duration_seconds,
            status: "completed".to_string(),
            created_by: Some(doc.created_by.clone()),
            created_at: Some(Utc::now()),
        };
        self.docs
            .write()
            .unwrap()
            .insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn find_by_id(
        &self,
        id: &DocumentationId,
    ) -> Result<Option<GeneratedDocumentation>, DomainError> {
        Ok(self.docs.read().unwrap().get(id).cloned())
    }
}

// ============================================================================
// In-Memory ELSTER Submission Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryElsterSubmissionRepository {
    submissions: Arc<RwLock<Vec<ElsterSubmission>>>,
}

impl InMemoryElsterSubmissionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<ElsterSubmission> {
        self.submissions.read().unwrap().clone()
    }
}

#[async_trait]
impl ElsterSubmissionRepository for InMemoryElsterSubmissionRepository {
    async fn create(
        &self,
        submission: &NewElsterSubmission,
    ) -> Result<ElsterSubmission, DomainError> {
        let created = ElsterSubmission {
            id: SubmissionId(new_id()),
            building_id: submission.building_id.clone(),
            tax_year: submission.tax_year,
            form_type: "anlage_v".to_string(),
            status: submission.status,
            form_data: submission.form_data.clone(),
            validation_errors: submission.validation_errors.clone(),
            created_by: Some(submission.created_by.clone()),
            created_at: Some(Utc::now()),
        };
        self.submissions.write().unwrap().push(created.clone());
        Ok(created)
    }
}

// ============================================================================
// In-Memory Communication Repositories
// ============================================================================

#[derive(Default)]
pub struct InMemoryLetterShipmentRepository {
    letters: Arc<RwLock<Vec<LetterShipment>>>,
}

impl InMemoryLetterShipmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<LetterShipment> {
        self.letters.read().unwrap().clone()
    }
}

#[async_trait]
impl LetterShipmentRepository for InMemoryLetterShipmentRepository {
    async fn create(&self, shipment: &NewLetterShipment) -> Result<LetterShipment, DomainError> {
        let created = LetterShipment {
            id: new_id(),
            recipient_name: shipment.recipient_name.clone(),
            recipient_address: shipment.recipient_address.clone(),
            document_url: shipment.document_url.clone(),
            shipping_type: shipment.shipping_type,
            color: shipment.color,
            duplex: shipment.duplex,
            status: shipment.status,
            reference: shipment.reference.clone(),
            external_id: shipment.external_id.clone(),
            error_message: shipment.error_message.clone(),
            created_by: Some(shipment.created_by.clone()),
            created_at: Some(Utc::now()),
        };
        self.letters.write().unwrap().push(created.clone());
        Ok(created)
    }
}

#[derive(Default)]
pub struct InMemoryWhatsAppMessageRepository {
    messages: Arc<RwLock<Vec<WhatsAppMessage>>>,
}

impl InMemoryWhatsAppMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<WhatsAppMessage> {
        self.messages.read().unwrap().clone()
    }
}

#[async_trait]
impl WhatsAppMessageRepository for InMemoryWhatsAppMessageRepository {
    async fn create(&self, message: &NewWhatsAppMessage) -> Result<WhatsAppMessage, DomainError> {
        let created = WhatsAppMessage {
            id: new_id(),
            phone_number: message.phone_number.clone(),
            direction: message.direction,
            body: message.body.clone(),
            status: message.status,
            external_id: message.external_id.clone(),
            created_by: message.created_by.clone(),
            created_at: Some(Utc::now()),
        };
        self.messages.write().unwrap().push(created.clone());
        Ok(created)
    }

    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<WhatsAppMessage>, DomainError> {
        Ok(self
            .messages
            .read()
            .unwrap()
            .iter()
            .find(|m| m.external_id.as_deref() == Some(external_id))
            .cloned())
    }
}
