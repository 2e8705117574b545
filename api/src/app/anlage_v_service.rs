//! Anlage V wizard service
//!
//! Drives the five wizard steps. Each step either calls one backend function
//! or computes locally, and the draft moves forward only when the step
//! succeeded. The draft is returned to the caller after every step.

use chrono::{Datelike, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;

use crate::domain::entities::{
    net_income, AnlageVDraft, BuildingData, CostSummary, ElsterSubmission, IncomeSummary,
    NewElsterSubmission, SubmissionStatus, User, ValidationIssue, ValidationReport, WizardStep,
};
use crate::domain::ports::{BackendFunctions, ElsterSubmissionRepository};
use crate::error::{AppError, PlatformError};

pub const MAP_BUILDING_FUNCTION: &str = "mapBuildingDataToAnlageV";
pub const INCOME_FUNCTION: &str = "calculateAnlageVEinnahmen";
pub const COSTS_FUNCTION: &str = "calculateAnlageVWerbungskosten";
pub const VALIDATE_FUNCTION: &str = "validateAnlageV";

#[derive(Deserialize)]
struct ValidationResponse {
    #[serde(default)]
    issues: Vec<ValidationIssue>,
}

/// Service for the Anlage V wizard
pub struct AnlageVWizardService<BF, SR>
where
    BF: BackendFunctions + ?Sized,
    SR: ElsterSubmissionRepository + ?Sized,
{
    functions: Arc<BF>,
    submissions: Arc<SR>,
}

impl<BF, SR> AnlageVWizardService<BF, SR>
where
    BF: BackendFunctions + ?Sized,
    SR: ElsterSubmissionRepository + ?Sized,
{
    pub fn new(functions: Arc<BF>, submissions: Arc<SR>) -> Self {
        Self {
            functions,
            submissions,
        }
    }

    /// Call a step's backend function and decode its result
    ///
    /// Every failure, transport and decoding included, carries the step.
    async fn call_step<T: DeserializeOwned>(
        &self,
        step: WizardStep,
        function: &str,
        payload: serde_json::Value,
    ) -> Result<T, AppError> {
        let step_failed = |source: PlatformError| PlatformError::WizardStep {
            number: step.number(),
            step: step.to_string(),
            source: Box::new(source),
        };

        let response = self
            .functions
            .invoke(function, payload)
            .await
            .map_err(|e| {
                tracing::warn!(step = %step, function, error = %e, "Wizard step failed");
                step_failed(e)
            })?;

        serde_json::from_value(response).map_err(|e| {
            AppError::Platform(step_failed(PlatformError::Deserialization(format!(
                "unexpected result from {}: {}",
                function, e
            ))))
        })
    }

    /// Run the current step and move the draft to the next one
    pub async fn advance(&self, mut draft: AnlageVDraft) -> Result<AnlageVDraft, AppError> {
        draft
            .validate_inputs(Utc::now().year())
            .map_err(AppError::BadRequest)?;

        let scope = serde_json::json!({
            "building_id": draft.building_id,
            "tax_year": draft.tax_year,
        });

        match draft.step {
            WizardStep::BuildingData => {
                let building: BuildingData = self
                    .call_step(draft.step, MAP_BUILDING_FUNCTION, scope)
                    .await?;
                draft.building = Some(building);
            }
            WizardStep::Income => {
                let income: IncomeSummary =
                    self.call_step(draft.step, INCOME_FUNCTION, scope).await?;
                draft.income = Some(income);
            }
            WizardStep::Costs => {
                let costs: CostSummary = self.call_step(draft.step, COSTS_FUNCTION, scope).await?;
                draft.costs = Some(costs);
            }
            WizardStep::Summary => {
                let (Some(income), Some(costs)) = (&draft.income, &draft.costs) else {
                    return Err(AppError::BadRequest(
                        "Draft is missing income or costs; restart the wizard".to_string(),
                    ));
                };
                draft.net_income = Some(net_income(income, costs));
            }
            WizardStep::Validation => {
                let response: ValidationResponse = self
                    .call_step(draft.step, VALIDATE_FUNCTION, draft.form_data())
                    .await?;
                draft.validation = Some(ValidationReport::from_issues(response.issues));
            }
            WizardStep::Complete => return Ok(draft),
        }

        tracing::debug!(
            building_id = %draft.building_id,
            tax_year = draft.tax_year,
            step = %draft.step,
            "Wizard step completed"
        );
        draft.step = draft.step.next();
        Ok(draft)
    }

    /// Run every step for a building and tax year
    pub async fn run(&self, building_id: &str, tax_year: i32) -> Result<AnlageVDraft, AppError> {
        let mut draft = AnlageVDraft::new(building_id, tax_year);
        while !draft.is_complete() {
            draft = self.advance(draft).await?;
        }
        Ok(draft)
    }

    /// Store a completed draft as an ELSTER submission
    ///
    /// The draft comes from the client, so net income is recomputed and the
    /// form is validated again before the status is decided.
    pub async fn save_submission(
        &self,
        draft: &AnlageVDraft,
        user: &User,
    ) -> Result<ElsterSubmission, AppError> {
        if !draft.is_complete() {
            return Err(AppError::BadRequest(format!(
                "Wizard is at step {} ({}); finish all steps before saving",
                draft.step.number(),
                draft.step
            )));
        }
        draft
            .validate_inputs(Utc::now().year())
            .map_err(AppError::BadRequest)?;

        let (Some(_), Some(income), Some(costs), Some(_)) = (
            &draft.building,
            &draft.income,
            &draft.costs,
            &draft.validation,
        ) else {
            return Err(AppError::BadRequest(
                "Draft is missing wizard results; run the wizard again".to_string(),
            ));
        };

        let mut checked = draft.clone();
        checked.net_income = Some(net_income(income, costs));

        let response: ValidationResponse = self
            .call_step(WizardStep::Validation, VALIDATE_FUNCTION, checked.form_data())
            .await?;
        let report = ValidationReport::from_issues(response.issues);
        let status = if report.is_submittable() {
            SubmissionStatus::Validated
        } else {
            SubmissionStatus::Draft
        };

        let submission = NewElsterSubmission {
            building_id: draft.building_id.clone(),
            tax_year: draft.tax_year,
            status,
            form_data: checked.form_data(),
            validation_errors: report
                .critical_errors
                .iter()
                .map(|issue| issue.message.clone())
                .collect(),
            created_by: user.email.clone(),
        };

        let saved = self.submissions.create(&submission).await?;
        tracing::info!(
            submission_id = %saved.id,
            status = %saved.status,
            "Stored Anlage V submission"
        );
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{test_user, InMemoryElsterSubmissionRepository, MockBackendFunctions};
    use rust_decimal_macros::dec;

    type Service = AnlageVWizardService<MockBackendFunctions, InMemoryElsterSubmissionRepository>;

    fn happy_functions() -> MockBackendFunctions {
        MockBackendFunctions::new()
            .with_response(
                MAP_BUILDING_FUNCTION,
                serde_json::json!({
                    "building_id": "b-1",
                    "address": "Lindenstr. 4, 04109 Leipzig",
                    "units_count": 6,
                    "construction_year": 1928
                }),
            )
            .with_response(
                INCOME_FUNCTION,
                serde_json::json!({
                    "rent_income": "36000.00",
                    "operating_cost_prepayments": "7200.00"
                }),
            )
            .with_response(
                COSTS_FUNCTION,
                serde_json::json!({
                    "depreciation": "8500.00",
                    "loan_interest": "12000.00",
                    "maintenance": "3100.50"
                }),
            )
            .with_response(
                VALIDATE_FUNCTION,
                serde_json::json!({
                    "issues": [
                        { "severity": "warning", "field": "maintenance", "message": "Erhaltungsaufwand prüfen" },
                        { "severity": "info", "message": "Belege aufbewahren" }
                    ]
                }),
            )
    }

    fn create_service(
        functions: MockBackendFunctions,
    ) -> (Service, Arc<MockBackendFunctions>, Arc<InMemoryElsterSubmissionRepository>) {
        let functions = Arc::new(functions);
        let submissions = Arc::new(InMemoryElsterSubmissionRepository::new());
        (
            AnlageVWizardService::new(functions.clone(), submissions.clone()),
            functions,
            submissions,
        )
    }

    #[tokio::test]
    async fn run_completes_all_steps_in_order() {
        let (service, functions, _) = create_service(happy_functions());

        let draft = service.run("b-1", 2024).await.unwrap();

        assert!(draft.is_complete());
        assert_eq!(
            functions.called_functions(),
            vec![
                MAP_BUILDING_FUNCTION,
                INCOME_FUNCTION,
                COSTS_FUNCTION,
                VALIDATE_FUNCTION
            ]
        );
        assert_eq!(draft.net_income, Some(dec!(19599.50)));
        let report = draft.validation.unwrap();
        assert!(report.is_submittable());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.hints.len(), 1);
    }

    #[tokio::test]
    async fn validator_receives_assembled_form() {
        let (service, functions, _) = create_service(happy_functions());

        service.run("b-1", 2024).await.unwrap();

        let payload = functions.last_payload(VALIDATE_FUNCTION).unwrap();
        assert_eq!(payload["building_id"], "b-1");
        assert_eq!(payload["tax_year"], 2024);
        assert_eq!(payload["net_income"], "19599.50");
    }

    #[tokio::test]
    async fn advance_moves_one_step() {
        let (service, functions, _) = create_service(happy_functions());

        let draft = service
            .advance(AnlageVDraft::new("b-1", 2024))
            .await
            .unwrap();

        assert_eq!(draft.step, WizardStep::Income);
        assert_eq!(draft.building.unwrap().units_count, 6);
        assert_eq!(functions.called_functions().len(), 1);
    }

    #[tokio::test]
    async fn failing_step_is_named_and_stops_the_wizard() {
        let (service, functions, _) = create_service(happy_functions().failing(
            COSTS_FUNCTION,
            500,
            "Darlehen nicht gefunden",
        ));

        let err = service.run("b-1", 2024).await.unwrap_err();

        let message = err.to_string();
        assert!(message.contains("Wizard step 3 (costs)"), "{}", message);
        assert!(!functions
            .called_functions()
            .contains(&VALIDATE_FUNCTION.to_string()));
    }

    #[tokio::test]
    async fn invalid_tax_year_is_rejected_before_any_call() {
        let (service, functions, _) = create_service(happy_functions());

        let result = service.run("b-1", 1999).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert!(functions.called_functions().is_empty());
    }

    #[tokio::test]
    async fn summary_without_income_is_bad_request() {
        let (service, _, _) = create_service(happy_functions());
        let mut draft = AnlageVDraft::new("b-1", 2024);
        draft.step = WizardStep::Summary;

        let result = service.advance(draft).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn save_requires_complete_draft() {
        let (service, _, submissions) = create_service(happy_functions());

        let result = service
            .save_submission(&AnlageVDraft::new("b-1", 2024), &test_user())
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert!(submissions.all().is_empty());
    }

    #[tokio::test]
    async fn clean_draft_is_saved_as_validated() {
        let (service, _, _) = create_service(happy_functions());
        let draft = service.run("b-1", 2024).await.unwrap();

        let saved = service.save_submission(&draft, &test_user()).await.unwrap();

        assert_eq!(saved.status, SubmissionStatus::Validated);
        assert!(saved.validation_errors.is_empty());
        assert_eq!(saved.created_by.as_deref(), Some("verwalter@example.de"));
    }

    #[tokio::test]
    async fn draft_with_critical_errors_is_saved_as_draft() {
        let functions = happy_functions().with_response(
            VALIDATE_FUNCTION,
            serde_json::json!({
                "issues": [{ "severity": "critical", "message": "Steuernummer fehlt" }]
            }),
        );
        let (service, _, _) = create_service(functions);
        let draft = service.run("b-1", 2024).await.unwrap();

        let saved = service.save_submission(&draft, &test_user()).await.unwrap();

        assert_eq!(saved.status, SubmissionStatus::Draft);
        assert_eq!(saved.validation_errors, vec!["Steuernummer fehlt".to_string()]);
    }

    #[tokio::test]
    async fn throttled_step_is_named() {
        let (service, _, _) = create_service(happy_functions().rate_limited(INCOME_FUNCTION));

        let err = service.run("b-1", 2024).await.unwrap_err();

        match err {
            AppError::Platform(PlatformError::WizardStep {
                number,
                step,
                source,
            }) => {
                assert_eq!(number, 2);
                assert_eq!(step, "income");
                assert!(matches!(*source, PlatformError::RateLimited));
            }
            other => panic!("expected wizard step error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn undecodable_step_result_is_named() {
        let functions = happy_functions().with_response(
            COSTS_FUNCTION,
            serde_json::json!({ "depreciation": "viel" }),
        );
        let (service, _, _) = create_service(functions);

        let err = service.run("b-1", 2024).await.unwrap_err();

        assert!(
            err.to_string().contains("Wizard step 3 (costs) failed"),
            "{}",
            err
        );
    }

    #[tokio::test]
    async fn complete_draft_without_results_is_rejected() {
        let (service, functions, submissions) = create_service(happy_functions());
        let draft: AnlageVDraft = serde_json::from_value(serde_json::json!({
            "building_id": "b-1",
            "tax_year": 2024,
            "step": "complete"
        }))
        .unwrap();

        let result = service.save_submission(&draft, &test_user()).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert!(submissions.all().is_empty());
        assert!(functions.called_functions().is_empty());
    }

    #[tokio::test]
    async fn save_ignores_client_net_income_and_report() {
        let functions = happy_functions().with_response(
            VALIDATE_FUNCTION,
            serde_json::json!({
                "issues": [{ "severity": "critical", "message": "Steuernummer fehlt" }]
            }),
        );
        let (service, functions, _) = create_service(functions);
        let mut draft = service.run("b-1", 2024).await.unwrap();
        draft.net_income = Some(dec!(1000000));
        draft.validation = Some(ValidationReport::default());

        let saved = service.save_submission(&draft, &test_user()).await.unwrap();

        assert_eq!(saved.status, SubmissionStatus::Draft);
        assert_eq!(saved.form_data["net_income"], "19599.50");
        assert_eq!(
            functions.last_payload(VALIDATE_FUNCTION).unwrap()["net_income"],
            "19599.50"
        );
    }

    #[tokio::test]
    async fn save_rejects_out_of_range_tax_year() {
        let (service, _, submissions) = create_service(happy_functions());
        let mut draft = service.run("b-1", 2024).await.unwrap();
        draft.tax_year = 1990;

        let result = service.save_submission(&draft, &test_user()).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert!(submissions.all().is_empty());
    }
}
