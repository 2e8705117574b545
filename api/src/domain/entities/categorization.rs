//! Categorization domain entities
//!
//! Bank transactions and the sender/receiver rules used to categorize them.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Platform id of a categorization rule
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleId(pub String);

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Platform id of a bank transaction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub String);

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A rule mapping a sender/receiver substring to a booking category
#[derive(Debug, Clone, Serialize)]
pub struct CategorizationRule {
    pub id: RuleId,
    pub name: String,
    /// Case-insensitive substring matched against the transaction's sender/receiver
    pub sender_receiver_contains: String,
    pub category: String,
    pub is_active: bool,
    /// Stored on the record but not used for ordering; list order decides.
    pub priority: i32,
    pub match_count: i64,
    pub created_at: Option<DateTime<Utc>>,
}

impl CategorizationRule {
    /// Check if this rule applies to the given sender/receiver
    pub fn matches(&self, sender_receiver: &str) -> bool {
        let pattern = self.sender_receiver_contains.trim();
        if !self.is_active || pattern.is_empty() {
            return false;
        }
        sender_receiver
            .to_lowercase()
            .contains(&pattern.to_lowercase())
    }
}

/// First active rule (in list order) whose pattern is contained in `sender_receiver`
pub fn find_matching_rule<'a>(
    rules: &'a [CategorizationRule],
    sender_receiver: &str,
) -> Option<&'a CategorizationRule> {
    if sender_receiver.trim().is_empty() {
        return None;
    }
    rules.iter().find(|rule| rule.matches(sender_receiver))
}

/// Data needed to create a new rule
#[derive(Debug, Clone, Serialize)]
pub struct NewCategorizationRule {
    pub name: String,
    pub sender_receiver_contains: String,
    pub category: String,
    pub is_active: bool,
    pub priority: i32,
}

impl NewCategorizationRule {
    pub fn validate(&self) -> Result<(), String> {
        if self.sender_receiver_contains.trim().is_empty() {
            return Err("sender_receiver_contains must not be empty".to_string());
        }
        if self.category.trim().is_empty() {
            return Err("category must not be empty".to_string());
        }
        Ok(())
    }
}

/// A rule the user may want to create after categorizing by hand
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSuggestion {
    pub name: String,
    pub sender_receiver_contains: String,
    pub category: String,
}

impl RuleSuggestion {
    /// Suggest a rule from a manual categorization choice
    pub fn from_choice(sender_receiver: &str, category: &str) -> Option<Self> {
        let sender_receiver = sender_receiver.trim();
        if sender_receiver.is_empty() || category.trim().is_empty() {
            return None;
        }
        Some(Self {
            name: format!("{} -> {}", sender_receiver, category),
            sender_receiver_contains: sender_receiver.to_string(),
            category: category.to_string(),
        })
    }

    pub fn into_new_rule(self) -> NewCategorizationRule {
        NewCategorizationRule {
            name: self.name,
            sender_receiver_contains: self.sender_receiver_contains,
            category: self.category,
            is_active: true,
            priority: 0,
        }
    }
}

/// An imported bank transaction
#[derive(Debug, Clone, Serialize)]
pub struct BankTransaction {
    pub id: TransactionId,
    pub transaction_date: Option<NaiveDate>,
    pub amount: Decimal,
    pub sender_receiver: String,
    pub purpose: Option<String>,
    pub category: Option<String>,
    pub is_categorized: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_rule(id: &str, pattern: &str, category: &str, is_active: bool) -> CategorizationRule {
        CategorizationRule {
            id: RuleId(id.to_string()),
            name: format!("rule {}", id),
            sender_receiver_contains: pattern.to_string(),
            category: category.to_string(),
            is_active,
            priority: 0,
            match_count: 0,
            created_at: None,
        }
    }

    #[test]
    fn rule_matches_case_insensitive_substring() {
        let rule = make_rule("r1", "stadtwerke", "Nebenkosten", true);
        assert!(rule.matches("STADTWERKE München GmbH"));
        assert!(rule.matches("Zahlung an Stadtwerke"));
        assert!(!rule.matches("Allianz Versicherung"));
    }

    #[test]
    fn inactive_rule_never_matches() {
        let rule = make_rule("r1", "Stadtwerke", "Nebenkosten", false);
        assert!(!rule.matches("Stadtwerke München"));
    }

    #[test]
    fn blank_pattern_never_matches() {
        let rule = make_rule("r1", "   ", "Nebenkosten", true);
        assert!(!rule.matches("anything"));
    }

    #[test]
    fn first_rule_in_list_order_wins() {
        let mut high_priority = make_rule("r2", "gmbh", "Sonstiges", true);
        high_priority.priority = 100;
        let rules = vec![
            make_rule("r1", "stadtwerke", "Nebenkosten", true),
            high_priority,
        ];

        let found = find_matching_rule(&rules, "Stadtwerke Köln GmbH").unwrap();
        assert_eq!(found.id, RuleId("r1".to_string()));
    }

    #[test]
    fn skips_inactive_rules_when_scanning() {
        let rules = vec![
            make_rule("r1", "stadtwerke", "Nebenkosten", false),
            make_rule("r2", "köln", "Sonstiges", true),
        ];

        let found = find_matching_rule(&rules, "Stadtwerke Köln").unwrap();
        assert_eq!(found.id, RuleId("r2".to_string()));
    }

    #[test]
    fn blank_sender_matches_nothing() {
        let rules = vec![make_rule("r1", "a", "Sonstiges", true)];
        assert!(find_matching_rule(&rules, "  ").is_none());
    }

    #[test]
    fn suggestion_from_choice() {
        let suggestion = RuleSuggestion::from_choice(" Hausmeister Schulz ", "Hauswart").unwrap();
        assert_eq!(suggestion.sender_receiver_contains, "Hausmeister Schulz");
        assert_eq!(suggestion.category, "Hauswart");

        let rule = suggestion.into_new_rule();
        assert!(rule.is_active);
        assert!(rule.validate().is_ok());
    }

    #[test]
    fn no_suggestion_without_sender() {
        assert!(RuleSuggestion::from_choice("", "Hauswart").is_none());
        assert!(RuleSuggestion::from_choice("Schulz", " ").is_none());
    }

    #[test]
    fn new_rule_validation() {
        let mut rule = NewCategorizationRule {
            name: "x".to_string(),
            sender_receiver_contains: "".to_string(),
            category: "Miete".to_string(),
            is_active: true,
            priority: 0,
        };
        assert!(rule.validate().unwrap_err().contains("sender_receiver_contains"));

        rule.sender_receiver_contains = "Mieter".to_string();
        rule.category = "".to_string();
        assert!(rule.validate().unwrap_err().contains("category"));
    }
}
