//! Google sign-in and account linking
//!
//! The callback resolves the remote profile to a local account in this order:
//! 1. a user already carrying the Google id,
//! 2. a user with the same email, which gets the Google id attached,
//! 3. a new provider-only user.
//!
//! State/cookie comparison happens in the HTTP handler before any of this runs.

use reqwest::StatusCode;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::credentials::normalize_email;
use super::error::AuthError;
use super::models::User;
use super::store::UserStore;
use crate::common::safe_email_log;
use crate::services::google::{GoogleProfile, OAuthProvider, GOOGLE_USERINFO_URL};
use crate::services::TokenIssuer;

pub struct OAuthService {
    store: Arc<dyn UserStore>,
    provider: Option<Arc<dyn OAuthProvider>>,
    tokens: TokenIssuer,
    userinfo_url: String,
}

impl OAuthService {
    pub fn new(
        store: Arc<dyn UserStore>,
        provider: Option<Arc<dyn OAuthProvider>>,
        tokens: TokenIssuer,
    ) -> Self {
        Self {
            store,
            provider,
            tokens,
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
        }
    }

    pub fn with_userinfo_url(mut self, url: &str) -> Self {
        self.userinfo_url = url.to_string();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    fn provider(&self) -> Result<&Arc<dyn OAuthProvider>, AuthError> {
        self.provider.as_ref().ok_or(AuthError::GoogleNotConfigured)
    }

    pub fn get_auth_url(&self, state: &str) -> Result<String, AuthError> {
        Ok(self.provider()?.build_auth_url(state))
    }

    /// Exchanges `code`, resolves the verified profile to a local user and returns a token.
    pub async fn handle_callback(&self, code: &str) -> Result<String, AuthError> {
        let provider = self.provider()?;

        let access_token = provider
            .exchange_code(code)
            .await
            .map_err(|_| AuthError::FailedExchange)?;

        let profile = self.fetch_profile(provider.as_ref(), &access_token).await?;

        if !profile.verified_email {
            warn!(
                google_id = %profile.id,
                email = %safe_email_log(&profile.email),
                "Rejecting Google login with unverified email"
            );
            return Err(AuthError::UnverifiedEmail);
        }

        let user = self.resolve_user(&profile).await?;
        let token = self.tokens.issue(user.id)?;

        info!(user_id = %user.id, provider = "google", "User authenticated via Google OAuth");
        Ok(token)
    }

    async fn fetch_profile(
        &self,
        provider: &dyn OAuthProvider,
        access_token: &str,
    ) -> Result<GoogleProfile, AuthError> {
        let client = provider.authenticated_client(access_token).map_err(|e| {
            warn!(error = %e, "Could not build Google API client");
            AuthError::FailedUserInfo
        })?;

        let response = client.get(&self.userinfo_url).send().await.map_err(|e| {
            warn!(error = %e, "HTTP error contacting Google userinfo endpoint");
            AuthError::FailedUserInfo
        })?;

        if response.status() != StatusCode::OK {
            warn!(http_status = %response.status(), "Google userinfo returned error status");
            return Err(AuthError::FailedUserInfo);
        }

        response.json::<GoogleProfile>().await.map_err(|e| {
            warn!(error = %e, "Failed to parse Google userinfo response");
            AuthError::FailedUserInfo
        })
    }

    async fn resolve_user(&self, profile: &GoogleProfile) -> Result<User, AuthError> {
        if let Some(user) = self.store.find_by_google_id(&profile.id).await? {
            debug!(user_id = %user.id, "Found existing user by Google id");
            return Ok(user);
        }

        let email = normalize_email(&profile.email);

        if let Some(user) = self.store.find_by_email(&email).await? {
            let linked = self.store.update_google_id(user.id, &profile.id).await?;
            info!(
                user_id = %linked.id,
                email = %safe_email_log(&email),
                "Linked Google account to existing user"
            );
            return Ok(linked);
        }

        let user = self.store.create_oauth_user(&email, &profile.id).await?;
        info!(
            user_id = %user.id,
            email = %safe_email_log(&email),
            "Created new user via Google OAuth"
        );
        Ok(user)
    }
}
