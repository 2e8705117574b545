//! Webhook handlers
//!
//! Handlers for WhatsApp Cloud API webhooks.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::app::InboundMessage;
use crate::error::AppError;
use crate::AppState;

/// Subscription handshake query (`hub.mode`, `hub.verify_token`, `hub.challenge`)
#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// WhatsApp webhook payload
#[derive(Debug, Deserialize)]
pub struct WhatsAppWebhookPayload {
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Deserialize)]
pub struct Change {
    #[serde(default)]
    pub value: ChangeValue,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub from: String,
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub text: Option<TextBody>,
}

#[derive(Debug, Deserialize)]
pub struct TextBody {
    pub body: String,
}

impl WhatsAppWebhookPayload {
    /// Text messages in the payload; status updates and media are skipped
    pub fn text_messages(self) -> Vec<InboundMessage> {
        self.entry
            .into_iter()
            .flat_map(|entry| entry.changes)
            .flat_map(|change| change.value.messages)
            .filter_map(|message| {
                if message.kind.as_deref().is_some_and(|kind| kind != "text") {
                    return None;
                }
                let text = message.text?;
                Some(InboundMessage {
                    from: message.from,
                    body: text.body,
                    external_id: message.id,
                })
            })
            .collect()
    }
}

/// Verify the webhook signature using HMAC-SHA256
fn verify_signature(payload: &[u8], signature: Option<&str>, secret: &Option<String>) -> bool {
    let Some(secret) = secret else {
        // No secret configured, skip verification (development mode)
        tracing::warn!("WhatsApp app secret not configured, skipping signature verification");
        return true;
    };

    let Some(sig_header) = signature else {
        tracing::warn!("No signature provided in webhook request");
        return false;
    };

    // Meta sends "sha256=<hex>"
    let Some(expected_hex) = sig_header.strip_prefix("sha256=") else {
        tracing::warn!("Signature header without sha256= prefix");
        return false;
    };

    type HmacSha256 = Hmac<Sha256>;
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => {
            tracing::error!("Invalid webhook secret key");
            return false;
        }
    };

    mac.update(payload);

    let expected_bytes = match hex::decode(expected_hex) {
        Ok(bytes) => bytes,
        Err(_) => {
            tracing::warn!("Invalid signature format");
            return false;
        }
    };

    mac.verify_slice(&expected_bytes).is_ok()
}

/// GET /webhooks/whatsapp
///
/// Subscription handshake: echo the challenge when the verify token matches.
pub async fn whatsapp_verify(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Result<String, AppError> {
    if !state.config.whatsapp_webhook_enabled() {
        tracing::warn!("WhatsApp handshake received but no verify token is configured");
        return Err(AppError::Forbidden);
    }

    let token_matches = query.verify_token.is_some()
        && query.verify_token == state.config.whatsapp_verify_token;

    match (query.mode.as_deref(), query.challenge) {
        (Some("subscribe"), Some(challenge)) if token_matches => {
            tracing::info!("WhatsApp webhook subscription verified");
            Ok(challenge)
        }
        _ => {
            tracing::warn!(mode = ?query.mode, "WhatsApp handshake rejected");
            Err(AppError::Forbidden)
        }
    }
}

/// POST /webhooks/whatsapp
///
/// Store inbound text messages.
pub async fn whatsapp_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let signature = headers
        .get("X-Hub-Signature-256")
        .and_then(|h| h.to_str().ok());

    if !verify_signature(&body, signature, &state.config.whatsapp_app_secret) {
        tracing::warn!("Webhook signature verification failed");
        return Err(AppError::Unauthorized);
    }

    let payload: WhatsAppWebhookPayload = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "Failed to parse webhook payload");
        AppError::BadRequest(format!("Invalid JSON: {}", e))
    })?;

    let messages = payload.text_messages();
    tracing::info!(count = messages.len(), "Received WhatsApp webhook");

    for message in messages {
        state.communication_service.record_inbound(message).await?;
    }

    Ok(StatusCode::OK)
}
