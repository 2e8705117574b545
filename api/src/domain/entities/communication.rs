//! Communication entities
//!
//! Postal letters (sent through LetterXpress) and WhatsApp messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Letter shipping option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShippingType {
    #[default]
    Standard,
    /// Einschreiben
    Registered,
    /// Einschreiben Rückschein
    RegisteredWithReceipt,
}

impl std::fmt::Display for ShippingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShippingType::Standard => write!(f, "standard"),
            ShippingType::Registered => write!(f, "registered"),
            ShippingType::RegisteredWithReceipt => write!(f, "registered_with_receipt"),
        }
    }
}

impl std::str::FromStr for ShippingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(ShippingType::Standard),
            "registered" => Ok(ShippingType::Registered),
            "registered_with_receipt" => Ok(ShippingType::RegisteredWithReceipt),
            _ => Err(format!("Unknown shipping type: {}", s)),
        }
    }
}

/// Delivery status of an outbound letter or message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Received,
    Failed,
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryStatus::Sent => write!(f, "sent"),
            DeliveryStatus::Received => write!(f, "received"),
            DeliveryStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sent" => Ok(DeliveryStatus::Sent),
            "received" => Ok(DeliveryStatus::Received),
            "failed" => Ok(DeliveryStatus::Failed),
            _ => Err(format!("Unknown delivery status: {}", s)),
        }
    }
}

/// A postal letter handed to the print-and-mail provider
#[derive(Debug, Clone, Serialize)]
pub struct LetterShipment {
    pub id: String,
    pub recipient_name: String,
    pub recipient_address: String,
    pub document_url: String,
    pub shipping_type: ShippingType,
    pub color: bool,
    pub duplex: bool,
    pub status: DeliveryStatus,
    /// Our client reference sent to the provider
    pub reference: String,
    /// Provider's job id
    pub external_id: Option<String>,
    pub error_message: Option<String>,
    pub created_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Data needed to record a letter
#[derive(Debug, Clone)]
pub struct NewLetterShipment {
    pub recipient_name: String,
    pub recipient_address: String,
    pub document_url: String,
    pub shipping_type: ShippingType,
    pub color: bool,
    pub duplex: bool,
    pub status: DeliveryStatus,
    pub reference: String,
    pub external_id: Option<String>,
    pub error_message: Option<String>,
    pub created_by: String,
}

/// Message direction relative to us
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageDirection {
    Inbound,
    Outbound,
}

impl std::fmt::Display for MessageDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageDirection::Inbound => write!(f, "inbound"),
            MessageDirection::Outbound => write!(f, "outbound"),
        }
    }
}

impl std::str::FromStr for MessageDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inbound" => Ok(MessageDirection::Inbound),
            "outbound" => Ok(MessageDirection::Outbound),
            _ => Err(format!("Unknown message direction: {}", s)),
        }
    }
}

/// A WhatsApp message exchanged with a contact
#[derive(Debug, Clone, Serialize)]
pub struct WhatsAppMessage {
    pub id: String,
    pub phone_number: String,
    pub direction: MessageDirection,
    pub body: String,
    pub status: DeliveryStatus,
    /// WhatsApp message id (wamid)
    pub external_id: Option<String>,
    pub created_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Data needed to record a message
#[derive(Debug, Clone)]
pub struct NewWhatsAppMessage {
    pub phone_number: String,
    pub direction: MessageDirection,
    pub body: String,
    pub status: DeliveryStatus,
    pub external_id: Option<String>,
    pub created_by: Option<String>,
}

/// Normalize a phone number to E.164 (`+<country><number>`)
///
/// Accepts `+49...`, `0049...` and bare international digits as sent by
/// WhatsApp webhooks. National numbers (`0151...`) are rejected since the
/// country is unknown.
pub fn normalize_phone_number(raw: &str) -> Option<String> {
    let compact: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '/' | '(' | ')'))
        .collect();

    let digits = if let Some(rest) = compact.strip_prefix('+') {
        rest.to_string()
    } else if let Some(rest) = compact.strip_prefix("00") {
        rest.to_string()
    } else if compact.starts_with('0') {
        return None;
    } else {
        compact
    };

    let e164 = regex::Regex::new(r"^[1-9]\d{7,14}$").ok()?;
    if e164.is_match(&digits) {
        Some(format!("+{}", digits))
    } else {
        None
    }
}
