//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::error::AuthError;
use crate::common::{safe_token_log, ApiError, AppState};

/// Authenticated caller
///
/// Verifies the bearer token on every request and exposes its subject. No database
/// lookup happens here; handlers that need the record load it themselves.
#[derive(Debug, Clone, Copy)]
pub struct AuthedUser {
    pub id: Uuid,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(app_state): Extension<Arc<AppState>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let header = match parts.headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok()) {
            Some(h) => h,
            None => {
                warn!("Authentication failed: missing Authorization header");
                return Err(ApiError::Unauthorized("missing auth".into()));
            }
        };

        // "Bearer <token>" or the raw token
        let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();

        match app_state.tokens.verify(token) {
            Ok(id) => {
                debug!(user_id = %id, "Request authenticated");
                Ok(AuthedUser { id })
            }
            Err(e) => {
                warn!(error = %e, token = %safe_token_log(token), "JWT token validation failed");
                Err(AuthError::from(e).into())
            }
        }
    }
}
