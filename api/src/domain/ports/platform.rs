//! Platform port traits
//!
//! The hosted backend platform authenticates callers and runs named backend
//! functions whose implementation lives outside this service.

use async_trait::async_trait;

use crate::domain::entities::User;
use crate::error::PlatformError;

/// Resolves a caller's bearer token to a platform user
#[async_trait]
pub trait PlatformAuth: Send + Sync {
    /// Look up the user owning `token`; `Unauthorized` when the token is invalid
    async fn me(&self, token: &str) -> Result<User, PlatformError>;
}

/// Invokes opaque backend functions by name
#[async_trait]
pub trait BackendFunctions: Send + Sync {
    async fn invoke(
        &self,
        function: &str,
        payload: serde_json::Value,
    ) -> Result<serde_json::Value, PlatformError>;
}
