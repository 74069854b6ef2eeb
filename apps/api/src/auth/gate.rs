//! # Access Gate
//!
//! Bearer-token middleware in front of every product and sale route.
//!
//! ```text
//! request ──► require_auth ──► handler(AuthUser)
//!               │  ├── no header / not "Bearer"  → 401 UNAUTHORIZED
//!               │  └── bad sig / malformed / exp → 401 INVALID_TOKEN
//!               └── Claims → request extensions
//! ```

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};

use super::session::{expires_at, Claims};
use crate::error::ApiError;
use crate::AppState;

/// Validates the bearer token and hands the claims to the handler.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header"))?;

    let token = extract_bearer_token(header)
        .ok_or_else(|| ApiError::unauthorized("Invalid Authorization header"))?;

    let claims = state.sessions.validate(token).map_err(|e| {
        warn!(path = %request.uri().path(), "Rejected token");
        e
    })?;

    debug!(user_id = claims.id, expires = ?expires_at(&claims), "Authenticated request");
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// The authenticated caller, as placed in extensions by [`require_auth`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
