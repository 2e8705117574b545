//! Platform adapter for CategorizationRuleRepository

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::client::{parse_timestamp, PlatformClient};
use super::to_domain_error;
use crate::domain::entities::{CategorizationRule, NewCategorizationRule, RuleId};
use crate::domain::ports::CategorizationRuleRepository;
use crate::error::DomainError;

const ENTITY: &str = "CategorizationRule";

/// Platform implementation of CategorizationRuleRepository
pub struct PlatformRuleRepository {
    platform: Arc<PlatformClient>,
}

impl PlatformRuleRepository {
    pub fn new(platform: Arc<PlatformClient>) -> Self {
        Self { platform }
    }
}

fn default_true() -> bool {
    true
}

/// Rule record as stored on the platform
#[derive(Debug, Deserialize)]
struct RuleRecord {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    sender_receiver_contains: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default = "default_true")]
    is_active: bool,
    #[serde(default)]
    priority: Option<i32>,
    #[serde(default)]
    match_count: Option<i64>,
    #[serde(default)]
    created_date: Option<String>,
}

#[derive(Serialize)]
struct CreateRuleRequest<'a> {
    name: &'a str,
    sender_receiver_contains: &'a str,
    category: &'a str,
    is_active: bool,
    priority: i32,
    match_count: i64,
}

#[async_trait]
impl CategorizationRuleRepository for PlatformRuleRepository {
    async fn list(&self) -> Result<Vec<CategorizationRule>, DomainError> {
        let records: Vec<RuleRecord> = self
            .platform
            .list_entities(ENTITY, None)
            .await
            .map_err(to_domain_error)?;

        Ok(records.into_iter().map(Into::into).collect())
    }

    async fn find_active(&self) -> Result<Vec<CategorizationRule>, DomainError> {
        let records: Vec<RuleRecord> = self
            .platform
            .filter_entities(ENTITY, &serde_json::json!({ "is_active": true }), None)
            .await
            .map_err(to_domain_error)?;

        Ok(records.into_iter().map(Into::into).collect())
    }

    async fn find_by_id(&self, id: &RuleId) -> Result<Option<CategorizationRule>, DomainError> {
        let record: Option<RuleRecord> = self
            .platform
            .get_entity(ENTITY, &id.0)
            .await
            .map_err(to_domain_error)?;

        Ok(record.map(Into::into))
    }

    async fn create(
        &self,
        rule: &NewCategorizationRule,
    ) -> Result<CategorizationRule, DomainError> {
        let request = CreateRuleRequest {
            name: &rule.name,
            sender_receiver_contains: &rule.sender_receiver_contains,
            category: &rule.category,
            is_active: rule.is_active,
            priority: rule.priority,
            match_count: 0,
        };

        let record: RuleRecord = self
            .platform
            .create_entity(ENTITY, &request)
            .await
            .map_err(to_domain_error)?;

        Ok(record.into())
    }

    async fn set_active(
        &self,
        id: &RuleId,
        is_active: bool,
    ) -> Result<CategorizationRule, DomainError> {
        let record: RuleRecord = self
            .platform
            .update_entity(ENTITY, &id.0, &serde_json::json!({ "is_active": is_active }))
            .await
            .map_err(to_domain_error)?;

        Ok(record.into())
    }

    async fn increment_match_count(
        &self,
        rule: &CategorizationRule,
    ) -> Result<CategorizationRule, DomainError> {
        let record: RuleRecord = self
            .platform
            .update_entity(
                ENTITY,
                &rule.id.0,
                &serde_json::json!({ "match_count": rule.match_count + 1 }),
            )
            .await
            .map_err(to_domain_error)?;

        Ok(record.into())
    }

    async fn delete(&self, id: &RuleId) -> Result<(), DomainError> {
        self.platform
            .delete_entity(ENTITY, &id.0)
            .await
            .map_err(to_domain_error)
    }
}

/// Convert platform record to domain entity
impl From<RuleRecord> for CategorizationRule {
    fn from(record: RuleRecord) -> Self {
        let sender_receiver_contains = record.sender_receiver_contains.unwrap_or_default();
        CategorizationRule {
            id: RuleId(record.id),
            name: record
                .name
                .unwrap_or_else(|| sender_receiver_contains.clone()),
            sender_receiver_contains,
            category: record.category.unwrap_or_default(),
            is_active: record.is_active,
            priority: record.priority.unwrap_or(0),
            match_count: record.match_count.unwrap_or(0),
            created_at: record.created_date.as_deref().and_then(parse_timestamp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_defaults_fill_missing_fields() {
        let record: RuleRecord = serde_json::from_value(serde_json::json!({
            "id": "r1",
            "sender_receiver_contains": "Stadtwerke",
            "category": "Nebenkosten"
        }))
        .unwrap();

        let rule: CategorizationRule = record.into();
        assert_eq!(rule.name, "Stadtwerke");
        assert!(rule.is_active);
        assert_eq!(rule.match_count, 0);
        assert_eq!(rule.priority, 0);
        assert!(rule.created_at.is_none());
    }

    #[test]
    fn record_keeps_stored_counter() {
        let record: RuleRecord = serde_json::from_value(serde_json::json!({
            "id": "r1",
            "name": "Strom",
            "sender_receiver_contains": "Stadtwerke",
            "category": "Nebenkosten",
            "is_active": false,
            "priority": 5,
            "match_count": 17,
            "created_date": "2025-01-02T03:04:05.000000"
        }))
        .unwrap();

        let rule: CategorizationRule = record.into();
        assert_eq!(rule.match_count, 17);
        assert!(!rule.is_active);
        assert!(rule.created_at.is_some());
    }
}
