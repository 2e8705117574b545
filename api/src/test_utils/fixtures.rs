//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.
//! Each fixture function creates a valid entity that can be customized.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::domain::entities::{
    BankTransaction, CategorizationRule, RuleId, TransactionId, User, UserId, UserRole, VersionId,
    VersionStatus, WorkflowVersion,
};

/// Create a regular platform user
pub fn test_user() -> User {
    User {
        id: UserId("user-1".to_string()),
        email: "verwalter@example.de".to_string(),
        full_name: Some("Petra Verwalter".to_string()),
        role: UserRole::User,
    }
}

/// Create an admin user
pub fn test_admin() -> User {
    User {
        id: UserId("admin-1".to_string()),
        email: "admin@example.de".to_string(),
        full_name: None,
        role: UserRole::Admin,
    }
}

/// Create an active rule
pub fn test_rule(id: &str, pattern: &str, category: &str) -> CategorizationRule {
    CategorizationRule {
        id: RuleId(id.to_string()),
        name: format!("{} -> {}", pattern, category),
        sender_receiver_contains: pattern.to_string(),
        category: category.to_string(),
        is_active: true,
        priority: 0,
        match_count: 0,
        created_at: Some(Utc::now()),
    }
}

/// Create an inactive rule
pub fn test_inactive_rule(id: &str, pattern: &str, category: &str) -> CategorizationRule {
    CategorizationRule {
        is_active: false,
        ..test_rule(id, pattern, category)
    }
}

/// Create an uncategorized transaction
pub fn test_transaction(id: &str, sender_receiver: &str) -> BankTransaction {
    BankTransaction {
        id: TransactionId(id.to_string()),
        transaction_date: NaiveDate::from_ymd_opt(2025, 3, 1),
        amount: Decimal::new(-12050, 2),
        sender_receiver: sender_receiver.to_string(),
        purpose: Some("Abschlag März".to_string()),
        category: None,
        is_categorized: false,
    }
}

/// Create a workflow version
pub fn test_version(
    id: &str,
    workflow_id: &str,
    version_number: i32,
    status: VersionStatus,
) -> WorkflowVersion {
    WorkflowVersion {
        id: VersionId(id.to_string()),
        workflow_id: workflow_id.to_string(),
        version_number,
        status,
        changelog: None,
        definition: serde_json::json!({ "steps": [] }),
        activated_at: None,
        archived_at: None,
        created_at: Some(Utc::now()),
    }
}
