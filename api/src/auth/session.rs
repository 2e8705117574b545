//! Platform session authentication middleware

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};

use crate::domain::entities::User;
use crate::domain::ports::PlatformAuth;
use crate::error::{AppError, PlatformError};
use crate::AppState;

/// Extract the bearer token from the Authorization header
fn extract_bearer_token(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolve a token to a user through any `PlatformAuth`
pub async fn authenticate<A: PlatformAuth + ?Sized>(
    auth: &A,
    token: Option<&str>,
) -> Result<User, AppError> {
    let token = token.ok_or(AppError::Unauthorized)?;

    match auth.me(token).await {
        Ok(user) => Ok(user),
        Err(PlatformError::Unauthorized) => Err(AppError::Unauthorized),
        Err(e) => {
            tracing::warn!(error = %e, "Platform session lookup failed");
            Err(AppError::Platform(e))
        }
    }
}

/// Authentication middleware
///
/// Asks the platform who owns the bearer token and injects the User into
/// request extensions. Routes that require authentication use this middleware.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate(state.auth.as_ref(), extract_bearer_token(&request)).await?;

    tracing::debug!(user_id = %user.id, "Authenticated request");
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
