//! Communication service
//!
//! Postal letters and WhatsApp messages. Delivery goes through backend
//! functions; every attempt is recorded, including failed ones.

use serde::Deserialize;
use std::sync::Arc;

use crate::domain::entities::{
    normalize_phone_number, DeliveryStatus, LetterShipment, MessageDirection, NewLetterShipment,
    NewWhatsAppMessage, ShippingType, User, WhatsAppMessage,
};
use crate::domain::ports::{BackendFunctions, LetterShipmentRepository, WhatsAppMessageRepository};
use crate::error::{AppError, PlatformError};

pub const LETTER_FUNCTION: &str = "sendLetterXpress";
pub const WHATSAPP_FUNCTION: &str = "sendWhatsAppMessage";

/// WhatsApp's limit for a text message body
pub const MAX_MESSAGE_LENGTH: usize = 4096;

/// A letter to send
#[derive(Debug, Clone)]
pub struct LetterRequest {
    pub recipient_name: String,
    pub recipient_address: String,
    pub document_url: String,
    pub shipping_type: ShippingType,
    pub color: bool,
    pub duplex: bool,
}

impl LetterRequest {
    fn validate(&self) -> Result<(), String> {
        if self.recipient_name.trim().is_empty() {
            return Err("recipient_name must not be empty".to_string());
        }
        if self.recipient_address.trim().is_empty() {
            return Err("recipient_address must not be empty".to_string());
        }
        if !(self.document_url.starts_with("https://") || self.document_url.starts_with("http://"))
        {
            return Err("document_url must be an http(s) URL".to_string());
        }
        Ok(())
    }
}

/// A text message received through the webhook
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub from: String,
    pub body: String,
    pub external_id: String,
}

/// Provider answer; the id field name differs between functions
#[derive(Deserialize, Default)]
struct DeliveryResponse {
    #[serde(default, alias = "job_id", alias = "message_id")]
    id: Option<String>,
}

/// Service for outbound and inbound communication
pub struct CommunicationService<BF, LR, WR>
where
    BF: BackendFunctions + ?Sized,
    LR: LetterShipmentRepository + ?Sized,
    WR: WhatsAppMessageRepository + ?Sized,
{
    functions: Arc<BF>,
    letters: Arc<LR>,
    messages: Arc<WR>,
}

impl<BF, LR, WR> CommunicationService<BF, LR, WR>
where
    BF: BackendFunctions + ?Sized,
    LR: LetterShipmentRepository + ?Sized,
    WR: WhatsAppMessageRepository + ?Sized,
{
    pub fn new(functions: Arc<BF>, letters: Arc<LR>, messages: Arc<WR>) -> Self {
        Self {
            functions,
            letters,
            messages,
        }
    }

    async fn deliver(
        &self,
        function: &str,
        payload: serde_json::Value,
    ) -> Result<Option<String>, PlatformError> {
        let response = self.functions.invoke(function, payload).await?;
        let response: DeliveryResponse = serde_json::from_value(response).unwrap_or_default();
        Ok(response.id)
    }

    /// Send a letter and record the shipment
    pub async fn send_letter(
        &self,
        request: LetterRequest,
        user: &User,
    ) -> Result<LetterShipment, AppError> {
        request.validate().map_err(AppError::BadRequest)?;

        let reference = uuid::Uuid::new_v4().to_string();
        let payload = serde_json::json!({
            "reference": reference,
            "recipient": {
                "name": request.recipient_name,
                "address": request.recipient_address,
            },
            "document_url": request.document_url,
            "shipping_type": request.shipping_type.to_string(),
            "color": request.color,
            "duplex": request.duplex,
        });

        let delivery = self.deliver(LETTER_FUNCTION, payload).await;

        let mut shipment = NewLetterShipment {
            recipient_name: request.recipient_name,
            recipient_address: request.recipient_address,
            document_url: request.document_url,
            shipping_type: request.shipping_type,
            color: request.color,
            duplex: request.duplex,
            status: DeliveryStatus::Sent,
            reference,
            external_id: None,
            error_message: None,
            created_by: user.email.clone(),
        };

        match delivery {
            Ok(external_id) => {
                shipment.external_id = external_id;
                let stored = self.letters.create(&shipment).await?;
                tracing::info!(reference = %stored.reference, "Letter sent");
                Ok(stored)
            }
            Err(e) => {
                tracing::warn!(reference = %shipment.reference, error = %e, "Letter delivery failed");
                shipment.status = DeliveryStatus::Failed;
                shipment.error_message = Some(e.to_string());
                if let Err(record_err) = self.letters.create(&shipment).await {
                    tracing::error!(error = %record_err, "Failed to record failed letter");
                }
                Err(AppError::Platform(e))
            }
        }
    }

    /// Send a WhatsApp text message and record it
    pub async fn send_whatsapp(
        &self,
        phone_number: &str,
        body: &str,
        user: &User,
    ) -> Result<WhatsAppMessage, AppError> {
        let phone_number = normalize_phone_number(phone_number).ok_or_else(|| {
            AppError::BadRequest(format!("Invalid phone number: {}", phone_number))
        })?;
        let body = body.trim();
        if body.is_empty() {
            return Err(AppError::BadRequest("body must not be empty".to_string()));
        }
        if body.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(AppError::BadRequest(format!(
                "body exceeds {} characters",
                MAX_MESSAGE_LENGTH
            )));
        }

        let delivery = self
            .deliver(
                WHATSAPP_FUNCTION,
                serde_json::json!({ "to": phone_number, "body": body }),
            )
            .await;

        let mut message = NewWhatsAppMessage {
            phone_number,
            direction: MessageDirection::Outbound,
            body: body.to_string(),
            status: DeliveryStatus::Sent,
            external_id: None,
            created_by: Some(user.email.clone()),
        };

        match delivery {
            Ok(external_id) => {
                message.external_id = external_id;
                Ok(self.messages.create(&message).await?)
            }
            Err(e) => {
                tracing::warn!(error = %e, "WhatsApp delivery failed");
                message.status = DeliveryStatus::Failed;
                if let Err(record_err) = self.messages.create(&message).await {
                    tracing::error!(error = %record_err, "Failed to record failed message");
                }
                Err(AppError::Platform(e))
            }
        }
    }

    /// Record an inbound message; `None` for redeliveries and unusable senders
    pub async fn record_inbound(
        &self,
        inbound: InboundMessage,
    ) -> Result<Option<WhatsAppMessage>, AppError> {
        if self
            .messages
            .find_by_external_id(&inbound.external_id)
            .await?
            .is_some()
        {
            tracing::debug!(external_id = %inbound.external_id, "Skipping redelivered message");
            return Ok(None);
        }

        let Some(phone_number) = normalize_phone_number(&inbound.from) else {
            tracing::warn!(from = %inbound.from, "Ignoring message from invalid number");
            return Ok(None);
        };

        let message = NewWhatsAppMessage {
            phone_number,
            direction: MessageDirection::Inbound,
            body: inbound.body,
            status: DeliveryStatus::Received,
            external_id: Some(inbound.external_id),
            created_by: None,
        };

        Ok(Some(self.messages.create(&message).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        test_user, InMemoryLetterShipmentRepository, InMemoryWhatsAppMessageRepository,
        MockBackendFunctions,
    };

    type Service = CommunicationService<
        MockBackendFunctions,
        InMemoryLetterShipmentRepository,
        InMemoryWhatsAppMessageRepository,
    >;

    struct Harness {
        service: Service,
        functions: Arc<MockBackendFunctions>,
        letters: Arc<InMemoryLetterShipmentRepository>,
        messages: Arc<InMemoryWhatsAppMessageRepository>,
    }

    fn harness(functions: MockBackendFunctions) -> Harness {
        let functions = Arc::new(functions);
        let letters = Arc::new(InMemoryLetterShipmentRepository::new());
        let messages = Arc::new(InMemoryWhatsAppMessageRepository::new());
        Harness {
            service: CommunicationService::new(functions.clone(), letters.clone(), messages.clone()),
            functions,
            letters,
            messages,
        }
    }

    fn letter() -> LetterRequest {
        LetterRequest {
            recipient_name: "Erika Mustermann".to_string(),
            recipient_address: "Hauptstr. 1, 10115 Berlin".to_string(),
            document_url: "https://files.test/nebenkosten.pdf".to_string(),
            shipping_type: ShippingType::Registered,
            color: false,
            duplex: true,
        }
    }

    #[tokio::test]
    async fn sent_letter_is_recorded_with_provider_id() {
        let h = harness(
            MockBackendFunctions::new()
                .with_response(LETTER_FUNCTION, serde_json::json!({ "job_id": "lx-991" })),
        );

        let shipment = h.service.send_letter(letter(), &test_user()).await.unwrap();

        assert_eq!(shipment.status, DeliveryStatus::Sent);
        assert_eq!(shipment.external_id.as_deref(), Some("lx-991"));
        let payload = h.functions.last_payload(LETTER_FUNCTION).unwrap();
        assert_eq!(payload["reference"], shipment.reference.as_str());
        assert_eq!(payload["shipping_type"], "registered");
    }

    #[tokio::test]
    async fn failed_letter_is_recorded_and_returned() {
        let h = harness(MockBackendFunctions::new().failing(
            LETTER_FUNCTION,
            402,
            "Guthaben reicht nicht",
        ));

        let result = h.service.send_letter(letter(), &test_user()).await;

        assert!(matches!(result, Err(AppError::Platform(_))));
        let recorded = h.letters.all();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].status, DeliveryStatus::Failed);
        assert!(recorded[0]
            .error_message
            .as_deref()
            .unwrap()
            .contains("Guthaben"));
    }

    #[tokio::test]
    async fn invalid_letter_never_reaches_provider() {
        let h = harness(MockBackendFunctions::new());
        let request = LetterRequest {
            document_url: "file:///tmp/brief.pdf".to_string(),
            ..letter()
        };

        let result = h.service.send_letter(request, &test_user()).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert!(h.functions.called_functions().is_empty());
        assert!(h.letters.all().is_empty());
    }

    #[tokio::test]
    async fn whatsapp_number_is_normalized_before_sending() {
        let h = harness(MockBackendFunctions::new().with_response(
            WHATSAPP_FUNCTION,
            serde_json::json!({ "message_id": "wamid.HBg" }),
        ));

        let message = h
            .service
            .send_whatsapp("0049 151 2345 6789", "Termin am Montag", &test_user())
            .await
            .unwrap();

        assert_eq!(message.phone_number, "+4915123456789");
        assert_eq!(message.direction, MessageDirection::Outbound);
        assert_eq!(message.external_id.as_deref(), Some("wamid.HBg"));
        assert_eq!(
            h.functions.last_payload(WHATSAPP_FUNCTION).unwrap()["to"],
            "+4915123456789"
        );
    }

    #[tokio::test]
    async fn whatsapp_rejects_national_number() {
        let h = harness(MockBackendFunctions::new());

        let result = h
            .service
            .send_whatsapp("0151 23456789", "Hallo", &test_user())
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert!(h.messages.all().is_empty());
    }

    #[tokio::test]
    async fn whatsapp_rejects_empty_body() {
        let h = harness(MockBackendFunctions::new());

        let result = h
            .service
            .send_whatsapp("+4915123456789", "   ", &test_user())
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn inbound_redelivery_is_stored_once() {
        let h = harness(MockBackendFunctions::new());
        let inbound = InboundMessage {
            from: "4915123456789".to_string(),
            body: "Die Heizung ist ausgefallen".to_string(),
            external_id: "wamid.1".to_string(),
        };

        let first = h.service.record_inbound(inbound.clone()).await.unwrap();
        let second = h.service.record_inbound(inbound).await.unwrap();

        let first = first.unwrap();
        assert_eq!(first.status, DeliveryStatus::Received);
        assert_eq!(first.phone_number, "+4915123456789");
        assert!(second.is_none());
        assert_eq!(h.messages.all().len(), 1);
    }
}
