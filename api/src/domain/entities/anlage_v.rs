//! Anlage V domain entities
//!
//! The rental-income tax attachment assembled by the wizard. Aggregation and
//! validation run in backend functions; the types here hold their results.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Oldest tax year the wizard accepts
pub const MIN_TAX_YEAR: i32 = 2000;

/// Steps of the wizard, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    BuildingData,
    Income,
    Costs,
    Summary,
    Validation,
    Complete,
}

impl WizardStep {
    pub fn next(self) -> Self {
        match self {
            WizardStep::BuildingData => WizardStep::Income,
            WizardStep::Income => WizardStep::Costs,
            WizardStep::Costs => WizardStep::Summary,
            WizardStep::Summary => WizardStep::Validation,
            WizardStep::Validation | WizardStep::Complete => WizardStep::Complete,
        }
    }

    /// 1-based position shown to the user
    pub fn number(self) -> u8 {
        match self {
            WizardStep::BuildingData => 1,
            WizardStep::Income => 2,
            WizardStep::Costs => 3,
            WizardStep::Summary => 4,
            WizardStep::Validation => 5,
            WizardStep::Complete => 6,
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WizardStep::BuildingData => write!(f, "building_data"),
            WizardStep::Income => write!(f, "income"),
            WizardStep::Costs => write!(f, "costs"),
            WizardStep::Summary => write!(f, "summary"),
            WizardStep::Validation => write!(f, "validation"),
            WizardStep::Complete => write!(f, "complete"),
        }
    }
}

fn default_ownership_share() -> Decimal {
    Decimal::ONE_HUNDRED
}

/// Building data mapped onto the form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingData {
    pub building_id: String,
    #[serde(default)]
    pub address: String,
    /// Owner's share in percent
    #[serde(default = "default_ownership_share")]
    pub ownership_share: Decimal,
    #[serde(default)]
    pub units_count: u32,
    #[serde(default)]
    pub construction_year: Option<i32>,
}

/// Einnahmen (income) aggregation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeSummary {
    #[serde(default)]
    pub rent_income: Decimal,
    #[serde(default)]
    pub operating_cost_prepayments: Decimal,
    #[serde(default)]
    pub other_income: Decimal,
    #[serde(default)]
    pub total: Option<Decimal>,
}

impl IncomeSummary {
    pub fn total(&self) -> Decimal {
        self.total.unwrap_or(
            self.rent_income + self.operating_cost_prepayments + self.other_income,
        )
    }
}

/// Werbungskosten (deductible costs) aggregation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostSummary {
    /// AfA
    #[serde(default)]
    pub depreciation: Decimal,
    #[serde(default)]
    pub loan_interest: Decimal,
    #[serde(default)]
    pub maintenance: Decimal,
    #[serde(default)]
    pub operating_costs: Decimal,
    #[serde(default)]
    pub administration: Decimal,
    #[serde(default)]
    pub other_costs: Decimal,
    #[serde(default)]
    pub total: Option<Decimal>,
}

impl CostSummary {
    pub fn total(&self) -> Decimal {
        self.total.unwrap_or(
            self.depreciation
                + self.loan_interest
                + self.maintenance
                + self.operating_costs
                + self.administration
                + self.other_costs,
        )
    }
}

/// Net rental income; negative values are losses
pub fn net_income(income: &IncomeSummary, costs: &CostSummary) -> Decimal {
    income.total() - costs.total()
}

/// How serious a validation finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Hint,
}

impl Severity {
    /// Map the validator's severity label; unknown labels are hints
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "critical" | "error" => Severity::Critical,
            "warning" | "warn" => Severity::Warning,
            _ => Severity::Hint,
        }
    }
}

/// One finding returned by the validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: String,
    #[serde(default)]
    pub field: Option<String>,
    pub message: String,
}

/// Validation findings split by severity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub critical_errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub hints: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        let mut report = Self::default();
        for issue in issues {
            match Severity::from_label(&issue.severity) {
                Severity::Critical => report.critical_errors.push(issue),
                Severity::Warning => report.warnings.push(issue),
                Severity::Hint => report.hints.push(issue),
            }
        }
        report
    }

    pub fn is_submittable(&self) -> bool {
        self.critical_errors.is_empty()
    }
}

/// Wizard state; carried by the client between steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnlageVDraft {
    pub building_id: String,
    pub tax_year: i32,
    pub step: WizardStep,
    #[serde(default)]
    pub building: Option<BuildingData>,
    #[serde(default)]
    pub income: Option<IncomeSummary>,
    #[serde(default)]
    pub costs: Option<CostSummary>,
    #[serde(default)]
    pub net_income: Option<Decimal>,
    #[serde(default)]
    pub validation: Option<ValidationReport>,
}

impl AnlageVDraft {
    pub fn new(building_id: impl Into<String>, tax_year: i32) -> Self {
        Self {
            building_id: building_id.into(),
            tax_year,
            step: WizardStep::BuildingData,
            building: None,
            income: None,
            costs: None,
            net_income: None,
            validation: None,
        }
    }

    /// Check the inputs shared by every step
    pub fn validate_inputs(&self, current_year: i32) -> Result<(), String> {
        if self.building_id.trim().is_empty() {
            return Err("building_id must not be empty".to_string());
        }
        if self.tax_year < MIN_TAX_YEAR || self.tax_year > current_year {
            return Err(format!(
                "tax_year must be between {} and {}",
                MIN_TAX_YEAR, current_year
            ));
        }
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.step == WizardStep::Complete
    }

    /// Form payload handed to the validator and stored with a submission
    pub fn form_data(&self) -> serde_json::Value {
        serde_json::json!({
            "building_id": self.building_id,
            "tax_year": self.tax_year,
            "building": self.building,
            "income": self.income,
            "costs": self.costs,
            "income_total": self.income.as_ref().map(IncomeSummary::total),
            "costs_total": self.costs.as_ref().map(CostSummary::total),
            "net_income": self.net_income,
        })
    }
}
