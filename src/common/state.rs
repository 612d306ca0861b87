// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;

use super::config::AppConfig;
use crate::auth::credentials::CredentialService;
use crate::auth::oauth::OAuthService;
use crate::auth::store::{SqliteUserStore, UserStore};
use crate::feeds::store::FeedStore;
use crate::services::google::GOOGLE_USERINFO_URL;
use crate::services::{OAuthProvider, TokenIssuer};

/// Immutable per-process services. Cloned into every request through an `Extension`.
#[derive(Clone)]
pub struct AppState {
    pub tokens: TokenIssuer,
    pub credentials: Arc<CredentialService>,
    pub oauth: Arc<OAuthService>,
    pub feeds: Arc<FeedStore>,
    pub cookie_secure: bool,
}

impl AppState {
    pub fn new(
        pool: SqlitePool,
        config: &AppConfig,
        provider: Option<Arc<dyn OAuthProvider>>,
    ) -> Self {
        Self::with_userinfo_url(pool, config, provider, GOOGLE_USERINFO_URL)
    }

    pub fn with_userinfo_url(
        pool: SqlitePool,
        config: &AppConfig,
        provider: Option<Arc<dyn OAuthProvider>>,
        userinfo_url: &str,
    ) -> Self {
        let tokens = TokenIssuer::new(config.jwt_secret.clone(), config.jwt_expiration_min);
        let users: Arc<dyn UserStore> = Arc::new(SqliteUserStore::new(pool.clone()));

        let credentials = Arc::new(CredentialService::new(users.clone(), tokens.clone()));
        let oauth = Arc::new(
            OAuthService::new(users, provider, tokens.clone()).with_userinfo_url(userinfo_url),
        );

        Self {
            tokens,
            credentials,
            oauth,
            feeds: Arc::new(FeedStore::new(pool)),
            cookie_secure: config.cookie_secure,
        }
    }
}
