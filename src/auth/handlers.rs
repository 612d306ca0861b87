//! Authentication handlers

use axum::{
    extract::{Extension, Json, Query},
    http::{
        header::{HeaderMap, SET_COOKIE},
        StatusCode,
    },
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::cookies::{clear_state_cookie, read_cookie, state_cookie, OAUTH_STATE_COOKIE};
use super::extractors::AuthedUser;
use super::models::{
    GoogleCallbackParams, LoginRequest, RegisterRequest, TokenResponse, UpdatePasswordRequest,
    UserIdResponse, UserResponse,
};
use super::validators::{LoginValidator, PasswordChangeValidator, RegisterValidator};
use crate::common::{safe_email_log, ApiError, AppState, Validator};
use crate::services::csrf;

/// POST /api/user/register
///
/// # Request Body
/// ```json
/// { "email": "a@b.com", "password": "..." }
/// ```
///
/// # Response
/// `201 Created` with `{ "id": "<uuid>" }`
pub async fn register_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserIdResponse>), ApiError> {
    let validation_result = RegisterValidator.validate(&request);
    if !validation_result.is_valid {
        warn!(
            email = %safe_email_log(&request.email),
            errors = ?validation_result.errors,
            "Registration validation failed"
        );
        return Err(ApiError::from(validation_result));
    }

    let user = state
        .credentials
        .register(&request.email, &request.password)
        .await?;

    Ok((StatusCode::CREATED, Json(UserIdResponse { id: user.id })))
}

/// POST /api/user/login
///
/// Every credential failure is the same 401.
pub async fn login_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    LoginValidator.validate(&request).into_result()?;

    let token = state
        .credentials
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(TokenResponse { token }))
}

/// PUT /api/user/password
pub async fn update_password_handler(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Json(request): Json<UpdatePasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    PasswordChangeValidator.validate(&request).into_result()?;

    state
        .credentials
        .update_password(authed.id, &request.old_password, &request.new_password)
        .await?;

    Ok(Json(serde_json::json!({ "message": "Password updated" })))
}

/// GET /api/user/me
pub async fn me_handler(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.credentials.get_user(authed.id).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// DELETE /api/user
///
/// Owned feeds go with the account through the foreign-key cascade.
pub async fn delete_user_handler(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
) -> Result<StatusCode, ApiError> {
    state.credentials.delete_user(authed.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/auth/google - Start Google OAuth flow
///
/// Binds a fresh state to the browser with a short-lived cookie and redirects to
/// the consent page. 503 when OAuth is not configured.
pub async fn google_oauth_start(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let oauth_state = csrf::generate_state();
    let auth_url = state.oauth.get_auth_url(&oauth_state).map_err(|e| {
        warn!(error = %e, "Google OAuth start requested but not available");
        ApiError::from(e)
    })?;

    info!("Redirecting to Google OAuth consent page");
    Ok((
        [(SET_COOKIE, state_cookie(&oauth_state, state.cookie_secure))],
        Redirect::temporary(&auth_url),
    )
        .into_response())
}

/// GET /api/auth/google/callback - Handle OAuth callback from Google
///
/// The state cookie is cleared on every outcome once the callback has been reached.
pub async fn google_oauth_callback(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<GoogleCallbackParams>,
) -> Response {
    let clear = [(SET_COOKIE, clear_state_cookie(state.cookie_secure))];

    match complete_google_login(&state, &headers, params).await {
        Ok(token) => (clear, Json(TokenResponse { token })).into_response(),
        Err(e) => (clear, e).into_response(),
    }
}

async fn complete_google_login(
    state: &AppState,
    headers: &HeaderMap,
    params: GoogleCallbackParams,
) -> Result<String, ApiError> {
    if let Some(oauth_error) = params.error {
        warn!(oauth_error = %oauth_error, "Google OAuth returned error");
        return Err(ApiError::BadRequest(format!(
            "authorization failed: {}",
            oauth_error
        )));
    }

    let (code, returned_state) = match (params.code, params.state) {
        (Some(code), Some(state)) if !code.is_empty() && !state.is_empty() => (code, state),
        _ => {
            warn!("OAuth callback missing code or state");
            return Err(ApiError::BadRequest("missing code or state".to_string()));
        }
    };

    match read_cookie(headers, OAUTH_STATE_COOKIE) {
        Some(expected) if !expected.is_empty() && expected == returned_state => {}
        Some(_) => {
            warn!("OAuth callback state does not match cookie");
            return Err(ApiError::BadRequest("invalid oauth state".to_string()));
        }
        None => {
            warn!("OAuth callback without state cookie");
            return Err(ApiError::BadRequest("invalid oauth state".to_string()));
        }
    }

    state.oauth.handle_callback(&code).await.map_err(|e| {
        error!(error = %e, "Google OAuth callback failed");
        ApiError::from(e)
    })
}
