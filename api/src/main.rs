//! immoflow API Server
//!
//! Backend for German property management: transaction categorization, the
//! Anlage V wizard, workflow versioning, documentation reports and tenant
//! communication. Records, auth and opaque backend functions live on the
//! hosted platform. Uses hexagonal (ports & adapters) architecture.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    middleware,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Serialize;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::GovernorLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod auth;
mod config;
mod domain;
mod error;
mod handlers;
mod reports;

#[cfg(test)]
mod test_utils;


use adapters::{
    PlatformClient, PlatformDocumentationRepository, PlatformElsterSubmissionRepository,
    PlatformLetterShipmentRepository, PlatformRuleRepository, PlatformTransactionRepository,
    PlatformWhatsAppMessageRepository, PlatformWorkflowVersionRepository,
};
use app::{
    AnlageVWizardService, CategorizationService, CommunicationService, DocumentationService,
    WorkflowVersionService,
};
use config::Config;
use domain::ports::{
    BackendFunctions, BankTransactionRepository, CategorizationRuleRepository,
    DocumentationRepository, ElsterSubmissionRepository, LetterShipmentRepository, PlatformAuth,
    WhatsAppMessageRepository, WorkflowVersionRepository,
};

/// Port implementations the services run on
#[derive(Clone)]
pub struct Ports {
    pub auth: Arc<dyn PlatformAuth>,
    pub functions: Arc<dyn BackendFunctions>,
    pub rules: Arc<dyn CategorizationRuleRepository>,
    pub transactions: Arc<dyn BankTransactionRepository>,
    pub versions: Arc<dyn WorkflowVersionRepository>,
    pub documentation: Arc<dyn DocumentationRepository>,
    pub submissions: Arc<dyn ElsterSubmissionRepository>,
    pub letters: Arc<dyn LetterShipmentRepository>,
    pub messages: Arc<dyn WhatsAppMessageRepository>,
}

impl Ports {
    /// Every port backed by the hosted platform
    pub fn platform(config: &Config) -> Self {
        let platform = Arc::new(PlatformClient::new(
            config.platform_url.clone(),
            config.platform_app_id.clone(),
            config.platform_service_token.clone(),
        ));

        Self {
            rules: Arc::new(PlatformRuleRepository::new(platform.clone())),
            transactions: Arc::new(PlatformTransactionRepository::new(platform.clone())),
            versions: Arc::new(PlatformWorkflowVersionRepository::new(platform.clone())),
            documentation: Arc::new(PlatformDocumentationRepository::new(platform.clone())),
            submissions: Arc::new(PlatformElsterSubmissionRepository::new(platform.clone())),
            letters: Arc::new(PlatformLetterShipmentRepository::new(platform.clone())),
            messages: Arc::new(PlatformWhatsAppMessageRepository::new(platform.clone())),
            auth: platform.clone(),
            functions: platform,
        }
    }
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn PlatformAuth>,
    pub documentation_service: Arc<DocumentationService<dyn DocumentationRepository>>,
    pub categorization_service: Arc<
        CategorizationService<dyn CategorizationRuleRepository, dyn BankTransactionRepository>,
    >,
    pub anlage_v_service:
        Arc<AnlageVWizardService<dyn BackendFunctions, dyn ElsterSubmissionRepository>>,
    pub workflow_service: Arc<WorkflowVersionService<dyn WorkflowVersionRepository>>,
    pub communication_service: Arc<
        CommunicationService<
            dyn BackendFunctions,
            dyn LetterShipmentRepository,
            dyn WhatsAppMessageRepository,
        >,
    >,
    pub config: Config,
}

impl AppState {
    /// Wire services over the platform client
    pub fn new(config: Config) -> Self {
        Self::with_ports(Ports::platform(&config), config)
    }

    pub fn with_ports(ports: Ports, config: Config) -> Self {
        Self {
            auth: ports.auth,
            documentation_service: Arc::new(DocumentationService::new(ports.documentation)),
            categorization_service: Arc::new(CategorizationService::new(
                ports.rules,
                ports.transactions,
            )),
            anlage_v_service: Arc::new(AnlageVWizardService::new(
                ports.functions.clone(),
                ports.submissions,
            )),
            workflow_service: Arc::new(WorkflowVersionService::new(ports.versions)),
            communication_service: Arc::new(CommunicationService::new(
                ports.functions,
                ports.letters,
                ports.messages,
            )),
            config,
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the full router
pub fn app_router(state: AppState) -> anyhow::Result<Router> {
    // Rate limiting for paid outbound integrations: 1 req/sec sustained, burst of 10
    // Uses PeerIpKeyExtractor to get client IP from socket connection
    let governor_config = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(PeerIpKeyExtractor)
            .per_second(1)
            .burst_size(10)
            .finish()
            .context("Failed to build governor config")?,
    );

    let auth_layer = middleware::from_fn_with_state(state.clone(), auth::auth_middleware);

    // Authenticated, rate-limited routes (letters, WhatsApp)
    let outbound_routes = Router::new()
        .route("/letters", post(handlers::send_letter))
        .route("/whatsapp/messages", post(handlers::send_whatsapp))
        .route_layer(auth_layer.clone())
        .layer(GovernorLayer {
            config: governor_config,
        });

    // Authenticated routes
    let protected_routes = Router::new()
        // Documentation
        .route(
            "/functions/generateRoadmapDocumentation",
            post(handlers::generate_roadmap_documentation),
        )
        .route(
            "/functions/generateTestingDocumentation",
            post(handlers::generate_testing_documentation),
        )
        .route(
            "/functions/generateTimelineDocumentation",
            post(handlers::generate_timeline_documentation),
        )
        .route("/documentation/:id", get(handlers::get_documentation))
        // Categorization
        .route(
            "/categorization/rules",
            get(handlers::list_rules).post(handlers::create_rule),
        )
        .route(
            "/categorization/rules/:id",
            patch(handlers::update_rule).delete(handlers::delete_rule),
        )
        .route("/transactions/apply-rules", post(handlers::apply_rules))
        .route(
            "/transactions/:id/rule-preview",
            get(handlers::preview_rule),
        )
        .route(
            "/transactions/:id/categorize",
            post(handlers::categorize_transaction),
        )
        // Anlage V
        .route("/anlage-v/wizard", post(handlers::run_wizard))
        .route("/anlage-v/wizard/step", post(handlers::advance_wizard))
        .route("/anlage-v/submissions", post(handlers::save_submission))
        // Workflow versions
        .route(
            "/workflows/:workflow_id/versions",
            get(handlers::list_versions).post(handlers::create_version),
        )
        .route(
            "/workflows/:workflow_id/versions/active",
            get(handlers::get_active_version),
        )
        .route(
            "/workflow-versions/:id/activate",
            post(handlers::activate_version),
        )
        .route(
            "/workflow-versions/:id/archive",
            post(handlers::archive_version),
        )
        .route_layer(auth_layer);

    Ok(Router::new()
        // Health check (no auth)
        .route("/health", get(health))
        // Webhooks (no auth, uses signature verification)
        .route(
            "/webhooks/whatsapp",
            get(handlers::whatsapp_verify).post(handlers::whatsapp_webhook),
        )
        .merge(protected_routes)
        .merge(outbound_routes)
        // Middleware
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,immoflow_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting immoflow API...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        platform_url = %config.platform_url,
        app_id = %config.platform_app_id,
        whatsapp_webhook = config.whatsapp_webhook_enabled(),
        "Configuration loaded"
    );

    let port = config.port;
    let app = app_router(AppState::new(config))?;

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
