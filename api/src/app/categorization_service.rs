//! Categorization service
//!
//! Assigns booking categories to bank transactions and maintains the rule
//! list that automates it.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::entities::{
    find_matching_rule, BankTransaction, CategorizationRule, NewCategorizationRule, RuleId,
    RuleSuggestion, TransactionId,
};
use crate::domain::ports::{BankTransactionRepository, CategorizationRuleRepository};
use crate::error::{AppError, DomainError};

/// Result of categorizing one transaction
#[derive(Debug, Clone, Serialize)]
pub struct CategorizationOutcome {
    pub transaction: BankTransaction,
    /// Rule that matched, with its incremented counter
    pub matched_rule: Option<CategorizationRule>,
    /// Offered when no rule matched and none was created
    pub suggested_rule: Option<RuleSuggestion>,
    pub created_rule: Option<CategorizationRule>,
}

/// Counts from a batch pass over uncategorized transactions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyRulesSummary {
    pub processed: usize,
    pub matched: usize,
    pub unmatched: usize,
}

/// Service for transaction categorization
pub struct CategorizationService<RR, TR>
where
    RR: CategorizationRuleRepository + ?Sized,
    TR: BankTransactionRepository + ?Sized,
{
    rules: Arc<RR>,
    transactions: Arc<TR>,
}

impl<RR, TR> CategorizationService<RR, TR>
where
    RR: CategorizationRuleRepository + ?Sized,
    TR: BankTransactionRepository + ?Sized,
{
    pub fn new(rules: Arc<RR>, transactions: Arc<TR>) -> Self {
        Self {
            rules,
            transactions,
        }
    }

    async fn find_transaction(&self, id: &TransactionId) -> Result<BankTransaction, AppError> {
        self.transactions
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Transaction {} not found", id)))
    }

    /// Categorize a transaction
    ///
    /// Without an explicit `category` the matching rule's category is used.
    /// A matching rule has its `match_count` incremented by one. Without a
    /// match, a rule is suggested from the choice, or created directly when
    /// `create_rule` is set.
    pub async fn categorize(
        &self,
        id: &TransactionId,
        category: Option<&str>,
        create_rule: bool,
    ) -> Result<CategorizationOutcome, AppError> {
        let transaction = self.find_transaction(id).await?;
        let rules = self.rules.find_active().await?;
        let matched = find_matching_rule(&rules, &transaction.sender_receiver).cloned();

        let category = match (category.map(str::trim), &matched) {
            (Some(c), _) if !c.is_empty() => c.to_string(),
            (_, Some(rule)) => rule.category.clone(),
            _ => {
                return Err(AppError::BadRequest(
                    "category is required when no rule matches".to_string(),
                ))
            }
        };

        let transaction = self.transactions.set_category(id, &category).await?;

        if let Some(rule) = matched {
            let rule = self.rules.increment_match_count(&rule).await?;
            tracing::debug!(
                transaction_id = %id,
                rule_id = %rule.id,
                match_count = rule.match_count,
                "Transaction categorized by rule"
            );
            return Ok(CategorizationOutcome {
                transaction,
                matched_rule: Some(rule),
                suggested_rule: None,
                created_rule: None,
            });
        }

        let suggestion = RuleSuggestion::from_choice(&transaction.sender_receiver, &category);
        match suggestion {
            Some(suggestion) if create_rule => {
                let created = self.rules.create(&suggestion.into_new_rule()).await?;
                tracing::info!(rule_id = %created.id, "Created rule from categorization");
                Ok(CategorizationOutcome {
                    transaction,
                    matched_rule: None,
                    suggested_rule: None,
                    created_rule: Some(created),
                })
            }
            suggestion => Ok(CategorizationOutcome {
                transaction,
                matched_rule: None,
                suggested_rule: suggestion,
                created_rule: None,
            }),
        }
    }

    /// Rule that would categorize a transaction, without writing anything
    pub async fn preview(
        &self,
        id: &TransactionId,
    ) -> Result<Option<CategorizationRule>, AppError> {
        let transaction = self.find_transaction(id).await?;
        let rules = self.rules.find_active().await?;
        Ok(find_matching_rule(&rules, &transaction.sender_receiver).cloned())
    }

    /// Categorize every uncategorized transaction that matches a rule
    pub async fn apply_rules_to_uncategorized(&self) -> Result<ApplyRulesSummary, AppError> {
        let mut rules = self.rules.find_active().await?;
        let transactions = self.transactions.find_uncategorized().await?;
        let mut summary = ApplyRulesSummary::default();

        for transaction in transactions {
            summary.processed += 1;

            let Some(rule) = find_matching_rule(&rules, &transaction.sender_receiver).cloned()
            else {
                summary.unmatched += 1;
                continue;
            };

            self.transactions
                .set_category(&transaction.id, &rule.category)
                .await?;
            let updated = self.rules.increment_match_count(&rule).await?;
            // Later matches must count up from the stored value
            if let Some(slot) = rules.iter_mut().find(|r| r.id == updated.id) {
                *slot = updated;
            }
            summary.matched += 1;
        }

        tracing::info!(
            processed = summary.processed,
            matched = summary.matched,
            "Applied categorization rules"
        );
        Ok(summary)
    }

    pub async fn list_rules(&self) -> Result<Vec<CategorizationRule>, AppError> {
        Ok(self.rules.list().await?)
    }

    pub async fn create_rule(
        &self,
        rule: NewCategorizationRule,
    ) -> Result<CategorizationRule, AppError> {
        rule.validate()
            .map_err(|e| AppError::Domain(DomainError::Validation(e)))?;
        Ok(self.rules.create(&rule).await?)
    }

    pub async fn set_rule_active(
        &self,
        id: &RuleId,
        is_active: bool,
    ) -> Result<CategorizationRule, AppError> {
        if self.rules.find_by_id(id).await?.is_none() {
            return Err(AppError::NotFound(format!("Rule {} not found", id)));
        }
        Ok(self.rules.set_active(id, is_active).await?)
    }

    pub async fn delete_rule(&self, id: &RuleId) -> Result<(), AppError> {
        if self.rules.find_by_id(id).await?.is_none() {
            return Err(AppError::NotFound(format!("Rule {} not found", id)));
        }
        self.rules.delete(id).await?;
        Ok(())
    }
}
