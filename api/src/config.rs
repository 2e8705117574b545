use std::env;

use anyhow::Context;

#[derive(Clone)]
pub struct Config {
    /// Base URL of the backend platform (auth, entities, functions)
    pub platform_url: String,
    /// Application id on the platform
    pub platform_app_id: String,
    /// Service-role token used for entity and function calls
    pub platform_service_token: String,
    /// App secret for verifying WhatsApp webhooks (HMAC-SHA256)
    pub whatsapp_app_secret: Option<String>,
    /// Token expected in the WhatsApp subscription handshake
    pub whatsapp_verify_token: Option<String>,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            platform_url: env::var("PLATFORM_URL")
                .unwrap_or_else(|_| "https://app.base44.com".to_string()),
            platform_app_id: env::var("PLATFORM_APP_ID").context("PLATFORM_APP_ID must be set")?,
            platform_service_token: env::var("PLATFORM_SERVICE_TOKEN")
                .context("PLATFORM_SERVICE_TOKEN must be set")?,
            whatsapp_app_secret: env::var("WHATSAPP_APP_SECRET").ok(),
            whatsapp_verify_token: env::var("WHATSAPP_VERIFY_TOKEN").ok(),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
        })
    }

    /// Check if inbound WhatsApp webhooks can be verified
    pub fn whatsapp_webhook_enabled(&self) -> bool {
        self.whatsapp_verify_token.is_some()
    }
}
