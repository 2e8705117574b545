//! HTTP client for the immoflow API
//!
//! Every call is made with the token of the person running the assistant,
//! so the API applies the same authentication and rate limits as the web app.

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;

/// HTTP client for communicating with the immoflow API
#[derive(Clone)]
pub struct ImmoflowClient {
    client: reqwest::Client,
    base_url: String,
}

impl ImmoflowClient {
    /// Create a new client from environment variables
    ///
    /// Required env vars:
    /// - IMMOFLOW_API_TOKEN: platform session token of the acting user
    /// - IMMOFLOW_API_URL: Base URL of the API (default http://localhost:8080)
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("IMMOFLOW_API_TOKEN")
            .context("IMMOFLOW_API_TOKEN not set. Copy the session token from the web app.")?;
        let base_url = std::env::var("IMMOFLOW_API_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());

        Self::new(&base_url, &token)
    }

    /// Create a new client with explicit configuration
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).context("Invalid token format")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[cfg(test)]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // --- Categorization ---

    pub async fn list_rules(&self) -> Result<String> {
        self.get_text("/categorization/rules").await
    }

    pub async fn create_rule(&self, pattern: &str, category: &str) -> Result<String> {
        self.post_text(
            "/categorization/rules",
            &CreateRuleRequest {
                sender_receiver_contains: pattern.to_string(),
                category: category.to_string(),
            },
        )
        .await
    }

    pub async fn set_rule_active(&self, rule_id: &str, is_active: bool) -> Result<String> {
        self.patch_text(
            &format!("/categorization/rules/{}", urlencoding::encode(rule_id)),
            &UpdateRuleRequest { is_active },
        )
        .await
    }

    pub async fn preview_rule(&self, transaction_id: &str) -> Result<String> {
        self.get_text(&format!(
            "/transactions/{}/rule-preview",
            urlencoding::encode(transaction_id)
        ))
        .await
    }

    pub async fn categorize_transaction(
        &self,
        transaction_id: &str,
        category: Option<&str>,
        create_rule: bool,
    ) -> Result<String> {
        self.post_text(
            &format!(
                "/transactions/{}/categorize",
                urlencoding::encode(transaction_id)
            ),
            &CategorizeRequest {
                category: category.map(|c| c.to_string()),
                create_rule,
            },
        )
        .await
    }

    pub async fn apply_rules(&self) -> Result<String> {
        self.post_text("/transactions/apply-rules", &serde_json::json!({}))
            .await
    }

    // --- Anlage V ---

    /// Runs every wizard step; the result is the finished draft
    pub async fn run_anlage_v_wizard(&self, building_id: &str, tax_year: i32) -> Result<String> {
        self.post_text(
            "/anlage-v/wizard",
            &RunWizardRequest {
                building_id: building_id.to_string(),
                tax_year,
            },
        )
        .await
    }

    /// Stores a finished draft as an ELSTER submission
    pub async fn save_anlage_v(&self, draft: serde_json::Value) -> Result<String> {
        self.post_text("/anlage-v/submissions", &serde_json::json!({ "draft": draft }))
            .await
    }

    // --- Workflow versions ---

    pub async fn list_workflow_versions(&self, workflow_id: &str) -> Result<String> {
        self.get_text(&format!(
            "/workflows/{}/versions",
            urlencoding::encode(workflow_id)
        ))
        .await
    }

    pub async fn create_workflow_version(
        &self,
        workflow_id: &str,
        definition: serde_json::Value,
        changelog: Option<&str>,
    ) -> Result<String> {
        self.post_text(
            &format!("/workflows/{}/versions", urlencoding::encode(workflow_id)),
            &CreateVersionRequest {
                definition,
                changelog: changelog.map(|c| c.to_string()),
            },
        )
        .await
    }

    pub async fn activate_workflow_version(
        &self,
        version_id: &str,
        transition_strategy: Option<&str>,
    ) -> Result<String> {
        self.post_text(
            &format!(
                "/workflow-versions/{}/activate",
                urlencoding::encode(version_id)
            ),
            &ActivateVersionRequest {
                transition_strategy: transition_strategy.map(|s| s.to_string()),
            },
        )
        .await
    }

    pub async fn archive_workflow_version(&self, version_id: &str) -> Result<String> {
        self.post_text(
            &format!(
                "/workflow-versions/{}/archive",
                urlencoding::encode(version_id)
            ),
            &serde_json::json!({}),
        )
        .await
    }

    // --- Documentation ---

    /// `kind` is one of roadmap, testing or timeline
    pub async fn generate_documentation(&self, kind: &str) -> Result<String> {
        let function = documentation_function(kind)
            .with_context(|| format!("Unknown documentation type '{}'", kind))?;
        self.post_text(&format!("/functions/{}", function), &serde_json::json!({}))
            .await
    }

    pub async fn get_documentation(&self, id: &str) -> Result<String> {
        self.get_text(&format!("/documentation/{}", urlencoding::encode(id)))
            .await
    }

    // --- Communication ---

    pub async fn send_whatsapp(&self, phone_number: &str, body: &str) -> Result<String> {
        self.post_text(
            "/whatsapp/messages",
            &SendWhatsAppRequest {
                phone_number: phone_number.to_string(),
                body: body.to_string(),
            },
        )
        .await
    }

    pub async fn send_letter(&self, letter: &SendLetterRequest) -> Result<String> {
        self.post_text("/letters", letter).await
    }

    // --- Internal helpers ---

    async fn get_text(&self, path: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to GET {}", path))?;

        handle_text_response(response).await
    }

    async fn post_text<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to POST {}", path))?;

        handle_text_response(response).await
    }

    async fn patch_text<T: Serialize>(&self, path: &str, body: &T) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .patch(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to PATCH {}", path))?;

        handle_text_response(response).await
    }
}

fn documentation_function(kind: &str) -> Option<&'static str> {
    match kind.trim().to_lowercase().as_str() {
        "roadmap" => Some("generateRoadmapDocumentation"),
        "testing" => Some("generateTestingDocumentation"),
        "timeline" => Some("generateTimelineDocumentation"),
        _ => None,
    }
}

async fn handle_text_response(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    let body = response
        .text()
        .await
        .context("Failed to read response body")?;

    if !status.is_success() {
        anyhow::bail!("API error ({}): {}", status, body);
    }

    // 204 responses (rule deletion) carry no body
    if body.is_empty() {
        return Ok(status.to_string());
    }

    Ok(body)
}

// --- Request Types ---

#[derive(Debug, Serialize)]
struct CreateRuleRequest {
    sender_receiver_contains: String,
    category: String,
}

#[derive(Debug, Serialize)]
struct UpdateRuleRequest {
    is_active: bool,
}

#[derive(Debug, Serialize)]
struct CategorizeRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    create_rule: bool,
}

#[derive(Debug, Serialize)]
struct RunWizardRequest {
    building_id: String,
    tax_year: i32,
}

#[derive(Debug, Serialize)]
struct CreateVersionRequest {
    definition: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    changelog: Option<String>,
}

#[derive(Debug, Serialize)]
struct ActivateVersionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    transition_strategy: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendWhatsAppRequest {
    phone_number: String,
    body: String,
}

#[derive(Debug, Serialize)]
pub struct SendLetterRequest {
    pub recipient_name: String,
    pub recipient_address: String,
    pub document_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_type: Option<String>,
    pub color: bool,
    pub duplex: bool,
}
