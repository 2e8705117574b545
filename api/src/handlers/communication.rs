//! Communication handlers
//!
//! Outbound letters and WhatsApp messages.

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;

use crate::app::LetterRequest;
use crate::domain::entities::{LetterShipment, ShippingType, User, WhatsAppMessage};
use crate::error::AppError;
use crate::AppState;

/// Request body for sending a letter
#[derive(Debug, Deserialize)]
pub struct SendLetterRequest {
    pub recipient_name: String,
    pub recipient_address: String,
    /// Publicly readable PDF
    pub document_url: String,
    #[serde(default)]
    pub shipping_type: ShippingType,
    #[serde(default)]
    pub color: bool,
    #[serde(default)]
    pub duplex: bool,
}

impl From<SendLetterRequest> for LetterRequest {
    fn from(request: SendLetterRequest) -> Self {
        LetterRequest {
            recipient_name: request.recipient_name,
            recipient_address: request.recipient_address,
            document_url: request.document_url,
            shipping_type: request.shipping_type,
            color: request.color,
            duplex: request.duplex,
        }
    }
}

/// Request body for sending a WhatsApp message
#[derive(Debug, Deserialize)]
pub struct SendWhatsAppRequest {
    pub phone_number: String,
    pub body: String,
}

/// POST /letters
pub async fn send_letter(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<SendLetterRequest>,
) -> Result<(StatusCode, Json<LetterShipment>), AppError> {
    let shipment = state
        .communication_service
        .send_letter(request.into(), &user)
        .await?;
    Ok((StatusCode::CREATED, Json(shipment)))
}

/// POST /whatsapp/messages
pub async fn send_whatsapp(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<SendWhatsAppRequest>,
) -> Result<(StatusCode, Json<WhatsAppMessage>), AppError> {
    let message = state
        .communication_service
        .send_whatsapp(&request.phone_number, &request.body, &user)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}
