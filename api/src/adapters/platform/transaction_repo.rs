//! Platform adapter for BankTransactionRepository

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;

use super::client::PlatformClient;
use super::to_domain_error;
use crate::domain::entities::{BankTransaction, TransactionId};
use crate::domain::ports::BankTransactionRepository;
use crate::error::DomainError;

const ENTITY: &str = "BankTransaction";

/// Platform implementation of BankTransactionRepository
pub struct PlatformTransactionRepository {
    platform: Arc<PlatformClient>,
}

impl PlatformTransactionRepository {
    pub fn new(platform: Arc<PlatformClient>) -> Self {
        Self { platform }
    }
}

/// Transaction record as stored on the platform
#[derive(Debug, Deserialize)]
struct TransactionRecord {
    id: String,
    #[serde(default)]
    transaction_date: Option<String>,
    #[serde(default)]
    amount: Option<Decimal>,
    #[serde(default)]
    sender_receiver: Option<String>,
    #[serde(default)]
    purpose: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    is_categorized: bool,
}

#[async_trait]
impl BankTransactionRepository for PlatformTransactionRepository {
    async fn find_by_id(&self, id: &TransactionId) -> Result<Option<BankTransaction>, DomainError> {
        let record: Option<TransactionRecord> = self
            .platform
            .get_entity(ENTITY, &id.0)
            .await
            .map_err(to_domain_error)?;

        Ok(record.map(Into::into))
    }

    async fn find_uncategorized(&self) -> Result<Vec<BankTransaction>, DomainError> {
        let records: Vec<TransactionRecord> = self
            .platform
            .filter_entities(
                ENTITY,
                &serde_json::json!({ "is_categorized": false }),
                Some("-transaction_date"),
            )
            .await
            .map_err(to_domain_error)?;

        Ok(records.into_iter().map(Into::into).collect())
    }

    async fn set_category(
        &self,
        id: &TransactionId,
        category: &str,
    ) -> Result<BankTransaction, DomainError> {
        let record: TransactionRecord = self
            .platform
            .update_entity(
                ENTITY,
                &id.0,
                &serde_json::json!({ "category": category, "is_categorized": true }),
            )
            .await
            .map_err(to_domain_error)?;

        Ok(record.into())
    }
}

/// Convert platform record to domain entity
impl From<TransactionRecord> for BankTransaction {
    fn from(record: TransactionRecord) -> Self {
        BankTransaction {
            id: TransactionId(record.id),
            // Dates arrive as `YYYY-MM-DD` or as full timestamps
            transaction_date: record
                .transaction_date
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d.get(..10)?, "%Y-%m-%d").ok()),
            amount: record.amount.unwrap_or_default(),
            sender_receiver: record.sender_receiver.unwrap_or_default(),
            purpose: record.purpose,
            category: record.category.filter(|c| !c.is_empty()),
            is_categorized: record.is_categorized,
        }
    }
}
