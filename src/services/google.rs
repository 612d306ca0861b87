// src/services/google.rs
use async_trait::async_trait;
use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::url::ParseError;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope,
    TokenResponse, TokenUrl,
};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::common::config::GoogleConfig;

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
pub const GOOGLE_SCOPES: [&str; 3] = ["openid", "email", "profile"];

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("authorization code exchange failed")]
    Exchange,

    #[error("failed to build authenticated client: {0}")]
    Client(String),
}

/// Profile returned by the Google userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub verified_email: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

/// The three OAuth2 operations the account-linking flow needs from an identity provider.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Consent-screen URL carrying `state`, requesting offline access.
    fn build_auth_url(&self, state: &str) -> String;

    /// Server-to-server exchange of an authorization code for an access token.
    async fn exchange_code(&self, code: &str) -> Result<String, ProviderError>;

    /// HTTP client that sends `access_token` as a bearer credential on every request.
    fn authenticated_client(&self, access_token: &str) -> Result<Client, ProviderError>;
}

/// Builds a client with `Authorization: Bearer <token>` as a default header.
pub fn bearer_client(access_token: &str) -> Result<Client, ProviderError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", access_token))
        .map_err(|e| ProviderError::Client(e.to_string()))?;
    value.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, value);

    Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(30))
        .no_proxy()
        .build()
        .map_err(|e| ProviderError::Client(e.to_string()))
}

#[derive(Clone)]
pub struct GoogleProvider {
    client: BasicClient,
}

impl GoogleProvider {
    pub fn new(config: &GoogleConfig) -> Result<Self, ParseError> {
        let client = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            AuthUrl::new(GOOGLE_AUTH_URL.to_string())?,
            Some(TokenUrl::new(GOOGLE_TOKEN_URL.to_string())?),
        )
        .set_redirect_uri(RedirectUrl::new(config.redirect_url.clone())?);

        Ok(Self { client })
    }
}

#[async_trait]
impl OAuthProvider for GoogleProvider {
    fn build_auth_url(&self, state: &str) -> String {
        let (url, _) = self
            .client
            .authorize_url(|| CsrfToken::new(state.to_string()))
            .add_scopes(GOOGLE_SCOPES.iter().map(|s| Scope::new(s.to_string())))
            .add_extra_param("access_type", "offline")
            .url();
        url.to_string()
    }

    async fn exchange_code(&self, code: &str) -> Result<String, ProviderError> {
        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(async_http_client)
            .await
            .map_err(|e| {
                warn!(error = %e, "Google authorization code exchange failed");
                ProviderError::Exchange
            })?;

        debug!("Exchanged Google authorization code for access token");
        Ok(token.access_token().secret().clone())
    }

    fn authenticated_client(&self, access_token: &str) -> Result<Client, ProviderError> {
        bearer_client(access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oauth2::url::Url;
    use std::collections::HashMap;

    fn provider() -> GoogleProvider {
        GoogleProvider::new(&GoogleConfig {
            client_id: "my-client".to_string(),
            client_secret: "my-secret".to_string(),
            redirect_url: "http://localhost:8080/api/auth/google/callback".to_string(),
        })
        .expect("valid config")
    }

    #[test]
    fn test_auth_url_embeds_client_redirect_scopes_and_state() {
        let url = Url::parse(&provider().build_auth_url("state-123")).expect("url");
        let query: HashMap<String, String> = url.query_pairs().into_owned().collect();

        assert!(url.as_str().starts_with(GOOGLE_AUTH_URL));
        assert_eq!(query.get("client_id").map(String::as_str), Some("my-client"));
        assert_eq!(
            query.get("redirect_uri").map(String::as_str),
            Some("http://localhost:8080/api/auth/google/callback")
        );
        assert_eq!(query.get("scope").map(String::as_str), Some("openid email profile"));
        assert_eq!(query.get("state").map(String::as_str), Some("state-123"));
        assert_eq!(query.get("access_type").map(String::as_str), Some("offline"));
        assert_eq!(query.get("response_type").map(String::as_str), Some("code"));
        assert!(!query.contains_key("client_secret"));
    }

    #[test]
    fn test_auth_url_is_deterministic() {
        let provider = provider();
        assert_eq!(provider.build_auth_url("s"), provider.build_auth_url("s"));
    }

    #[test]
    fn test_invalid_redirect_url_is_rejected() {
        let result = GoogleProvider::new(&GoogleConfig {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            redirect_url: "not a url".to_string(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_profile_defaults_missing_flags() {
        let profile: GoogleProfile =
            serde_json::from_str(r#"{"id":"g1","email":"a@b.com"}"#).expect("parse");
        assert!(!profile.verified_email);
        assert!(profile.name.is_none());
    }
}
