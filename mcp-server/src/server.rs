//! immoflow MCP Server implementation
//!
//! Tools map one-to-one onto API routes. API failures come back as tool
//! errors so the assistant can read the message and correct its input.

use crate::client::{ImmoflowClient, SendLetterRequest};
use anyhow::Result;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{
    handler::server::tool::ToolRouter,
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use schemars::JsonSchema;
use serde::Deserialize;

/// immoflow MCP Server
#[derive(Clone)]
pub struct ImmoflowServer {
    client: ImmoflowClient,
    tool_router: ToolRouter<Self>,
}

impl ImmoflowServer {
    pub fn from_env() -> Result<Self> {
        let client = ImmoflowClient::from_env()?;
        Ok(Self {
            client,
            tool_router: Self::tool_router(),
        })
    }

    #[cfg(test)]
    #[allow(dead_code)]
    pub fn new(client: ImmoflowClient) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }
}

fn tool_result(result: Result<String>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(content) => Ok(CallToolResult::success(vec![Content::text(content)])),
        Err(e) => Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
    }
}

// --- Tool Parameter Types ---

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateRuleParams {
    /// Case-insensitive text the sender/receiver must contain
    pub pattern: String,
    /// Category assigned to matching transactions
    pub category: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SetRuleActiveParams {
    /// Rule ID
    pub rule_id: String,
    pub is_active: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TransactionParams {
    /// Bank transaction ID
    pub transaction_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CategorizeParams {
    /// Bank transaction ID
    pub transaction_id: String,
    /// Category; omit to use the matching rule's category
    #[serde(default)]
    pub category: Option<String>,
    /// Create a rule from this choice when no rule matched
    #[serde(default)]
    pub create_rule: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WizardParams {
    /// Building ID
    pub building_id: String,
    /// Tax year, e.g. 2024
    pub tax_year: i32,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SaveAnlageVParams {
    /// Finished draft as returned by run_anlage_v_wizard
    pub draft: serde_json::Value,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WorkflowParams {
    /// Workflow ID
    pub workflow_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateVersionParams {
    /// Workflow ID
    pub workflow_id: String,
    /// Workflow definition (steps, triggers)
    pub definition: serde_json::Value,
    #[serde(default)]
    pub changelog: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ActivateVersionParams {
    /// Version ID
    pub version_id: String,
    /// "complete_on_current" (default) or "migrate_to_new"
    #[serde(default)]
    pub transition_strategy: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct VersionParams {
    /// Version ID
    pub version_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DocumentationParams {
    /// "roadmap", "testing" or "timeline"
    pub kind: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DocumentationIdParams {
    /// Documentation ID returned by generate_documentation
    pub documentation_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WhatsAppParams {
    /// Recipient in international format, e.g. +4915112345678
    pub phone_number: String,
    /// Message text
    pub body: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct LetterParams {
    pub recipient_name: String,
    /// Full postal address
    pub recipient_address: String,
    /// Publicly readable PDF URL
    pub document_url: String,
    /// "standard" (default), "registered" or "registered_with_receipt"
    #[serde(default)]
    pub shipping_type: Option<String>,
    #[serde(default)]
    pub color: bool,
    #[serde(default)]
    pub duplex: bool,
}

#[tool_router]
impl ImmoflowServer {
    // === Bank transaction categorization ===

    #[tool(description = "List all categorization rules in the order they are applied.")]
    async fn list_rules(&self) -> Result<CallToolResult, McpError> {
        tool_result(self.client.list_rules().await)
    }

    #[tool(description = "Create a categorization rule matching sender/receiver text.")]
    async fn create_rule(
        &self,
        params: Parameters<CreateRuleParams>,
    ) -> Result<CallToolResult, McpError> {
        tool_result(
            self.client
                .create_rule(&params.0.pattern, &params.0.category)
                .await,
        )
    }

    #[tool(description = "Enable or disable a categorization rule.")]
    async fn set_rule_active(
        &self,
        params: Parameters<SetRuleActiveParams>,
    ) -> Result<CallToolResult, McpError> {
        tool_result(
            self.client
                .set_rule_active(&params.0.rule_id, params.0.is_active)
                .await,
        )
    }

    #[tool(description = "Show which active rule would categorize a transaction; matched_rule is null when none matches.")]
    async fn preview_rule(
        &self,
        params: Parameters<TransactionParams>,
    ) -> Result<CallToolResult, McpError> {
        tool_result(self.client.preview_rule(&params.0.transaction_id).await)
    }

    #[tool(description = "Categorize a bank transaction. Without a category the matching rule decides.")]
    async fn categorize_transaction(
        &self,
        params: Parameters<CategorizeParams>,
    ) -> Result<CallToolResult, McpError> {
        tool_result(
            self.client
                .categorize_transaction(
                    &params.0.transaction_id,
                    params.0.category.as_deref(),
                    params.0.create_rule,
                )
                .await,
        )
    }

    #[tool(description = "Apply all active rules to every uncategorized transaction.")]
    async fn apply_rules(&self) -> Result<CallToolResult, McpError> {
        tool_result(self.client.apply_rules().await)
    }

    // === Anlage V ===

    #[tool(description = "Run the Anlage V wizard for a building and tax year. Returns the finished draft with validation results.")]
    async fn run_anlage_v_wizard(
        &self,
        params: Parameters<WizardParams>,
    ) -> Result<CallToolResult, McpError> {
        tool_result(
            self.client
                .run_anlage_v_wizard(&params.0.building_id, params.0.tax_year)
                .await,
        )
    }

    #[tool(description = "Save a finished Anlage V draft as an ELSTER submission.")]
    async fn save_anlage_v(
        &self,
        params: Parameters<SaveAnlageVParams>,
    ) -> Result<CallToolResult, McpError> {
        tool_result(self.client.save_anlage_v(params.0.draft).await)
    }

    // === Workflow versions ===

    #[tool(description = "List versions of a workflow, newest first.")]
    async fn list_workflow_versions(
        &self,
        params: Parameters<WorkflowParams>,
    ) -> Result<CallToolResult, McpError> {
        tool_result(
            self.client
                .list_workflow_versions(&params.0.workflow_id)
                .await,
        )
    }

    #[tool(description = "Create a new draft version of a workflow.")]
    async fn create_workflow_version(
        &self,
        params: Parameters<CreateVersionParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        tool_result(
            self.client
                .create_workflow_version(
                    &params.workflow_id,
                    params.definition,
                    params.changelog.as_deref(),
                )
                .await,
        )
    }

    #[tool(description = "Activate a draft version. The previously active version is archived.")]
    async fn activate_workflow_version(
        &self,
        params: Parameters<ActivateVersionParams>,
    ) -> Result<CallToolResult, McpError> {
        tool_result(
            self.client
                .activate_workflow_version(
                    &params.0.version_id,
                    params.0.transition_strategy.as_deref(),
                )
                .await,
        )
    }

    #[tool(description = "Archive a workflow version. Archived versions cannot be reactivated.")]
    async fn archive_workflow_version(
        &self,
        params: Parameters<VersionParams>,
    ) -> Result<CallToolResult, McpError> {
        tool_result(
            self.client
                .archive_workflow_version(&params.0.version_id)
                .await,
        )
    }

    // === Documentation ===

    #[tool(description = "Generate project documentation: 'roadmap', 'testing' or 'timeline'.")]
    async fn generate_documentation(
        &self,
        params: Parameters<DocumentationParams>,
    ) -> Result<CallToolResult, McpError> {
        tool_result(self.client.generate_documentation(&params.0.kind).await)
    }

    #[tool(description = "Fetch a generated documentation record including its Markdown.")]
    async fn get_documentation(
        &self,
        params: Parameters<DocumentationIdParams>,
    ) -> Result<CallToolResult, McpError> {
        tool_result(
            self.client
                .get_documentation(&params.0.documentation_id)
                .await,
        )
    }

    // === Tenant communication ===

    #[tool(description = "Send a WhatsApp text message to a tenant.")]
    async fn send_whatsapp(
        &self,
        params: Parameters<WhatsAppParams>,
    ) -> Result<CallToolResult, McpError> {
        tool_result(
            self.client
                .send_whatsapp(&params.0.phone_number, &params.0.body)
                .await,
        )
    }

    #[tool(description = "Send a PDF as a physical letter through LetterXpress. This costs money.")]
    async fn send_letter(&self, params: Parameters<LetterParams>) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let letter = SendLetterRequest {
            recipient_name: params.recipient_name,
            recipient_address: params.recipient_address,
            document_url: params.document_url,
            shipping_type: params.shipping_type,
            color: params.color,
            duplex: params.duplex,
        };
        tool_result(self.client.send_letter(&letter).await)
    }
}

#[tool_handler]
impl ServerHandler for ImmoflowServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "immoflow".into(),
                title: Some("immoflow MCP Server".into()),
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                r#"immoflow - Hausverwaltung backend

SETUP: Set IMMOFLOW_API_TOKEN to your session token and IMMOFLOW_API_URL to the API.

BANK TRANSACTIONS:
1. 'preview_rule' - See how a transaction would be categorized
2. 'categorize_transaction' - Assign a category (create_rule=true learns a rule)
3. 'apply_rules' - Categorize everything still open

ANLAGE V:
1. 'run_anlage_v_wizard' - Building data, income, costs, validation
2. Check critical_errors in the result; warnings and hints do not block
3. 'save_anlage_v' - Store the draft for ELSTER

WORKFLOWS:
- Exactly one version per workflow is active
- 'create_workflow_version' then 'activate_workflow_version'

TIPS:
- 'send_letter' triggers paid postage; confirm with the user first
- Phone numbers need the country code (+49...)"#
                    .into(),
            ),
        }
    }
}
