//! Unified error types for the immoflow API
//!
//! This module defines error types for each layer:
//! - `DomainError`: Core business logic errors
//! - `PlatformError`: Backend platform (auth, entities, functions) client errors
//! - `AppError`: Application layer errors (wraps domain errors for HTTP responses)

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Domain layer errors - pure business logic errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Entity already exists: {0}")]
    AlreadyExists(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// The platform itself failed (outage, rate limit, failing function)
    #[error("Platform error: {0}")]
    Platform(PlatformError),
}

/// Platform API client errors
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("{entity} not found: {id}")]
    EntityNotFound { entity: String, id: String },

    #[error("Backend function '{function}' failed ({status}): {message}")]
    FunctionFailed {
        function: String,
        status: u16,
        message: String,
    },

    #[error("Rate limited")]
    RateLimited,

    #[error("Unauthorized - invalid token")]
    Unauthorized,

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Wizard step {number} ({step}) failed: {source}")]
    WizardStep {
        number: u8,
        step: String,
        source: Box<PlatformError>,
    },
}

/// Application layer errors - used by HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

/// A platform call made with the service token failed; the caller did nothing wrong
fn upstream_failure(e: &PlatformError) -> (StatusCode, String, Option<String>) {
    let rate_limited = match e {
        PlatformError::WizardStep { source, .. } => {
            matches!(source.as_ref(), PlatformError::RateLimited)
        }
        other => matches!(other, PlatformError::RateLimited),
    };

    if rate_limited {
        (
            StatusCode::TOO_MANY_REQUESTS,
            "Rate limited".to_string(),
            Some(e.to_string()),
        )
    } else {
        (
            StatusCode::BAD_GATEWAY,
            "Platform error".to_string(),
            Some(e.to_string()),
        )
    }
}

/// Error response body for JSON responses
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Domain(DomainError::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "Not found".to_string(), Some(msg.clone()))
            }
            AppError::Domain(DomainError::AlreadyExists(msg)) => (
                StatusCode::CONFLICT,
                "Already exists".to_string(),
                Some(msg.clone()),
            ),
            AppError::Domain(DomainError::Validation(msg)) => (
                StatusCode::BAD_REQUEST,
                "Validation error".to_string(),
                Some(msg.clone()),
            ),
            AppError::Domain(DomainError::Unauthorized(msg)) => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized".to_string(),
                Some(msg.clone()),
            ),
            AppError::Domain(DomainError::Forbidden(msg)) => (
                StatusCode::FORBIDDEN,
                "Forbidden".to_string(),
                Some(msg.clone()),
            ),
            AppError::Domain(DomainError::Conflict(msg)) => {
                (StatusCode::CONFLICT, "Conflict".to_string(), Some(msg.clone()))
            }
            AppError::Domain(DomainError::Platform(e)) => {
                tracing::error!(error = %e, "Platform call failed");
                upstream_failure(e)
            }
            AppError::Domain(DomainError::Storage(msg))
            | AppError::Domain(DomainError::Internal(msg)) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone(), None)
            }
            AppError::Platform(e) => {
                tracing::error!("Platform error: {}", e);
                match e {
                    PlatformError::Unauthorized => (
                        StatusCode::UNAUTHORIZED,
                        "Unauthorized".to_string(),
                        None,
                    ),
                    PlatformError::EntityNotFound { .. } => (
                        StatusCode::NOT_FOUND,
                        "Not found".to_string(),
                        Some(e.to_string()),
                    ),
                    PlatformError::RateLimited => (
                        StatusCode::TOO_MANY_REQUESTS,
                        "Rate limited".to_string(),
                        None,
                    ),
                    PlatformError::Api { status, message } => {
                        let http_status = match *status {
                            404 => StatusCode::NOT_FOUND,
                            403 => StatusCode::FORBIDDEN,
                            422 => StatusCode::UNPROCESSABLE_ENTITY,
                            _ => StatusCode::BAD_GATEWAY,
                        };
                        (
                            http_status,
                            "Platform error".to_string(),
                            Some(message.clone()),
                        )
                    }
                    PlatformError::FunctionFailed { .. } => (
                        StatusCode::BAD_GATEWAY,
                        "Backend function failed".to_string(),
                        Some(e.to_string()),
                    ),
                    PlatformError::Deserialization(msg) => (
                        StatusCode::BAD_GATEWAY,
                        "Platform error".to_string(),
                        Some(msg.clone()),
                    ),
                    PlatformError::Request(_) => (
                        StatusCode::BAD_GATEWAY,
                        "Platform error".to_string(),
                        None,
                    ),
                    PlatformError::WizardStep { .. } => upstream_failure(e),
                }
            }
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "Bad request".to_string(),
                Some(msg.clone()),
            ),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string(), None),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string(), None),
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, "Not found".to_string(), Some(msg.clone()))
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone(), None)
            }
        };

        let body = Json(ErrorResponse { error, details });

        (status, body).into_response()
    }
}
