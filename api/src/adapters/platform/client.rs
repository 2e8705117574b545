//! Platform API client implementation
//!
//! Speaks the platform's REST API: entity CRUD under
//! `/api/apps/{app}/entities/{Entity}`, the current user under
//! `/entities/User/me` and backend functions under `/functions/{name}`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use urlencoding::encode;

use crate::domain::entities::{User, UserId, UserRole};
use crate::domain::ports::{BackendFunctions, PlatformAuth};
use crate::error::PlatformError;

/// Implementation of the platform API client
pub struct PlatformClient {
    http: Client,
    base_url: String,
    app_id: String,
    service_token: String,
}

impl PlatformClient {
    pub fn new(base_url: String, app_id: String, service_token: String) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id,
            service_token,
        }
    }

    fn app_url(&self, path: &str) -> String {
        format!("{}/api/apps/{}{}", self.base_url, self.app_id, path)
    }

    fn entity_url(&self, entity: &str) -> String {
        self.app_url(&format!("/entities/{}", entity))
    }

    fn record_url(&self, entity: &str, id: &str) -> String {
        format!("{}/{}", self.entity_url(entity), encode(id))
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, PlatformError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| PlatformError::Deserialization(e.to_string()))
        } else if status.as_u16() == 401 {
            Err(PlatformError::Unauthorized)
        } else if status.as_u16() == 429 {
            Err(PlatformError::RateLimited)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(PlatformError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn handle_empty_response(
        &self,
        response: reqwest::Response,
    ) -> Result<(), PlatformError> {
        let status = response.status();

        if status.is_success() {
            Ok(())
        } else if status.as_u16() == 401 {
            Err(PlatformError::Unauthorized)
        } else if status.as_u16() == 429 {
            Err(PlatformError::RateLimited)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(PlatformError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    /// List all records of an entity, optionally sorted (`-field` for descending)
    pub async fn list_entities<T: DeserializeOwned>(
        &self,
        entity: &str,
        sort: Option<&str>,
    ) -> Result<Vec<T>, PlatformError> {
        let mut url = self.entity_url(entity);
        if let Some(sort) = sort {
            url.push_str(&format!("?sort={}", encode(sort)));
        }

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.service_token)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List records whose fields equal the values in `query`
    pub async fn filter_entities<T: DeserializeOwned>(
        &self,
        entity: &str,
        query: &serde_json::Value,
        sort: Option<&str>,
    ) -> Result<Vec<T>, PlatformError> {
        let mut url = format!(
            "{}?q={}",
            self.entity_url(entity),
            encode(&query.to_string())
        );
        if let Some(sort) = sort {
            url.push_str(&format!("&sort={}", encode(sort)));
        }

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.service_token)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Fetch one record; `None` when the platform reports 404
    pub async fn get_entity<T: DeserializeOwned>(
        &self,
        entity: &str,
        id: &str,
    ) -> Result<Option<T>, PlatformError> {
        let response = self
            .http
            .get(self.record_url(entity, id))
            .bearer_auth(&self.service_token)
            .send()
            .await?;

        match self.handle_response(response).await {
            Ok(record) => Ok(Some(record)),
            Err(PlatformError::Api { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn create_entity<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        entity: &str,
        body: &B,
    ) -> Result<T, PlatformError> {
        let response = self
            .http
            .post(self.entity_url(entity))
            .bearer_auth(&self.service_token)
            .json(body)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Partial update; only the fields present in `body` change
    pub async fn update_entity<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        entity: &str,
        id: &str,
        body: &B,
    ) -> Result<T, PlatformError> {
        let response = self
            .http
            .put(self.record_url(entity, id))
            .bearer_auth(&self.service_token)
            .json(body)
            .send()
            .await?;

        match self.handle_response(response).await {
            Err(PlatformError::Api { status: 404, .. }) => Err(PlatformError::EntityNotFound {
                entity: entity.to_string(),
                id: id.to_string(),
            }),
            other => other,
        }
    }

    pub async fn delete_entity(&self, entity: &str, id: &str) -> Result<(), PlatformError> {
        let response = self
            .http
            .delete(self.record_url(entity, id))
            .bearer_auth(&self.service_token)
            .send()
            .await?;

        match self.handle_empty_response(response).await {
            Err(PlatformError::Api { status: 404, .. }) => Err(PlatformError::EntityNotFound {
                entity: entity.to_string(),
                id: id.to_string(),
            }),
            other => other,
        }
    }
}

/// Current-user payload
#[derive(Deserialize)]
struct UserResponse {
    id: String,
    email: String,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

impl From<UserResponse> for User {
    fn from(r: UserResponse) -> Self {
        User {
            id: UserId(r.id),
            email: r.email,
            full_name: r.full_name,
            role: r
                .role
                .and_then(|role| role.parse().ok())
                .unwrap_or(UserRole::User),
        }
    }
}

/// Error body returned by failing backend functions
#[derive(Deserialize)]
struct FunctionErrorBody {
    error: String,
}

#[async_trait]
impl PlatformAuth for PlatformClient {
    async fn me(&self, token: &str) -> Result<User, PlatformError> {
        let response = self
            .http
            .get(self.app_url("/entities/User/me"))
            .bearer_auth(token)
            .send()
            .await?;

        match self.handle_response::<UserResponse>(response).await {
            Ok(user) => Ok(user.into()),
            Err(PlatformError::Api { status: 403, .. }) => Err(PlatformError::Unauthorized),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl BackendFunctions for PlatformClient {
    async fn invoke(
        &self,
        function: &str,
        payload: serde_json::Value,
    ) -> Result<serde_json::Value, PlatformError> {
        tracing::debug!(function, "Invoking backend function");

        let response = self
            .http
            .post(self.app_url(&format!("/functions/{}", function)))
            .bearer_auth(&self.service_token)
            .json(&payload)
            .send()
            .await?;

        match self.handle_response(response).await {
            Err(PlatformError::Api { status, message }) => {
                // Functions answer `{ "error": "..." }`; fall back to the raw body
                let message = serde_json::from_str::<FunctionErrorBody>(&message)
                    .map(|body| body.error)
                    .unwrap_or(message);
                Err(PlatformError::FunctionFailed {
                    function: function.to_string(),
                    status,
                    message,
                })
            }
            other => other,
        }
    }
}

/// Parse the platform's timestamps (RFC 3339, or naive UTC with optional fraction)
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
