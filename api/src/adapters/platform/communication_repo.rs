//! Platform adapters for letter and WhatsApp records

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::client::{parse_timestamp, PlatformClient};
use super::to_domain_error;
use crate::domain::entities::{
    DeliveryStatus, LetterShipment, MessageDirection, NewLetterShipment, NewWhatsAppMessage,
    WhatsAppMessage,
};
use crate::domain::ports::{LetterShipmentRepository, WhatsAppMessageRepository};
use crate::error::DomainError;

const LETTER_ENTITY: &str = "LetterShipment";
const MESSAGE_ENTITY: &str = "WhatsAppMessage";

fn parse_status(raw: Option<String>, fallback: DeliveryStatus) -> DeliveryStatus {
    raw.and_then(|s| s.parse().ok()).unwrap_or(fallback)
}

/// Platform implementation of LetterShipmentRepository
pub struct PlatformLetterShipmentRepository {
    platform: Arc<PlatformClient>,
}

impl PlatformLetterShipmentRepository {
    pub fn new(platform: Arc<PlatformClient>) -> Self {
        Self { platform }
    }
}

#[derive(Debug, Deserialize)]
struct LetterRecord {
    id: String,
    #[serde(default)]
    recipient_name: String,
    #[serde(default)]
    recipient_address: String,
    #[serde(default)]
    document_url: String,
    #[serde(default)]
    shipping_type: Option<String>,
    #[serde(default)]
    color: bool,
    #[serde(default)]
    duplex: bool,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    reference: String,
    #[serde(default)]
    external_id: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    created_by: Option<String>,
    #[serde(default)]
    created_date: Option<String>,
}

#[derive(Serialize)]
struct CreateLetterRequest<'a> {
    recipient_name: &'a str,
    recipient_address: &'a str,
    document_url: &'a str,
    shipping_type: String,
    color: bool,
    duplex: bool,
    status: String,
    reference: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<&'a str>,
    created_by: &'a str,
}

#[async_trait]
impl LetterShipmentRepository for PlatformLetterShipmentRepository {
    async fn create(&self, shipment: &NewLetterShipment) -> Result<LetterShipment, DomainError> {
        let request = CreateLetterRequest {
            recipient_name: &shipment.recipient_name,
            recipient_address: &shipment.recipient_address,
            document_url: &shipment.document_url,
            shipping_type: shipment.shipping_type.to_string(),
            color: shipment.color,
            duplex: shipment.duplex,
            status: shipment.status.to_string(),
            reference: &shipment.reference,
            external_id: shipment.external_id.as_deref(),
            error_message: shipment.error_message.as_deref(),
            created_by: &shipment.created_by,
        };

        let record: LetterRecord = self
            .platform
            .create_entity(LETTER_ENTITY, &request)
            .await
            .map_err(to_domain_error)?;

        Ok(record.into())
    }
}

impl From<LetterRecord> for LetterShipment {
    fn from(record: LetterRecord) -> Self {
        LetterShipment {
            id: record.id,
            recipient_name: record.recipient_name,
            recipient_address: record.recipient_address,
            document_url: record.document_url,
            shipping_type: record
                .shipping_type
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            color: record.color,
            duplex: record.duplex,
            status: parse_status(record.status, DeliveryStatus::Sent),
            reference: record.reference,
            external_id: record.external_id,
            error_message: record.error_message,
            created_by: record.created_by,
            created_at: record.created_date.as_deref().and_then(parse_timestamp),
        }
    }
}

/// Platform implementation of WhatsAppMessageRepository
pub struct PlatformWhatsAppMessageRepository {
    platform: Arc<PlatformClient>,
}

impl PlatformWhatsAppMessageRepository {
    pub fn new(platform: Arc<PlatformClient>) -> Self {
        Self { platform }
    }
}

#[derive(Debug, Deserialize)]
struct MessageRecord {
    id: String,
    #[serde(default)]
    phone_number: String,
    #[serde(default)]
    direction: Option<String>,
    #[serde(default)]
    body: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    external_id: Option<String>,
    #[serde(default)]
    created_by: Option<String>,
    #[serde(default)]
    created_date: Option<String>,
}

#[derive(Serialize)]
struct CreateMessageRequest<'a> {
    phone_number: &'a str,
    direction: String,
    body: &'a str,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_by: Option<&'a str>,
}

#[async_trait]
impl WhatsAppMessageRepository for PlatformWhatsAppMessageRepository {
    async fn create(&self, message: &NewWhatsAppMessage) -> Result<WhatsAppMessage, DomainError> {
        let request = CreateMessageRequest {
            phone_number: &message.phone_number,
            direction: message.direction.to_string(),
            body: &message.body,
            status: message.status.to_string(),
            external_id: message.external_id.as_deref(),
            created_by: message.created_by.as_deref(),
        };

        let record: MessageRecord = self
            .platform
            .create_entity(MESSAGE_ENTITY, &request)
            .await
            .map_err(to_domain_error)?;

        Ok(record.into())
    }

    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<WhatsAppMessage>, DomainError> {
        let records: Vec<MessageRecord> = self
            .platform
            .filter_entities(
                MESSAGE_ENTITY,
                &serde_json::json!({ "external_id": external_id }),
                None,
            )
            .await
            .map_err(to_domain_error)?;

        Ok(records.into_iter().next().map(Into::into))
    }
}

impl From<MessageRecord> for WhatsAppMessage {
    fn from(record: MessageRecord) -> Self {
        let direction = record
            .direction
            .and_then(|s| s.parse().ok())
            .unwrap_or(MessageDirection::Outbound);
        let fallback = match direction {
            MessageDirection::Inbound => DeliveryStatus::Received,
            MessageDirection::Outbound => DeliveryStatus::Sent,
        };

        WhatsAppMessage {
            id: record.id,
            phone_number: record.phone_number,
            direction,
            body: record.body,
            status: parse_status(record.status, fallback),
            external_id: record.external_id,
            created_by: record.created_by,
            created_at: record.created_date.as_deref().and_then(parse_timestamp),
        }
    }
}
