// src/common/config.rs
//! Environment configuration

use std::env;
use tracing::warn;

use crate::services::tokens::DEFAULT_EXPIRATION_MINUTES;

const DEFAULT_DATABASE_URL: &str = "sqlite://pcast.db";
const DEFAULT_JWT_SECRET: &str = "replace_with_strong_secret";
const DEFAULT_GOOGLE_REDIRECT_URL: &str = "http://localhost:8080/api/auth/google/callback";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

/// Google OAuth client credentials. Present only when both id and secret are set.
#[derive(Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expiration_min: i64,
    pub google: Option<GoogleConfig>,
    pub cookie_secure: bool,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set, using the built-in development secret");
            DEFAULT_JWT_SECRET.to_string()
        });

        let jwt_expiration_min = match get("JWT_EXPIRATION_MIN") {
            Some(raw) => match raw.parse::<i64>() {
                Ok(minutes) if minutes > 0 => minutes,
                _ => {
                    warn!(value = %raw, "Invalid JWT_EXPIRATION_MIN, falling back to default");
                    DEFAULT_EXPIRATION_MINUTES
                }
            },
            None => DEFAULT_EXPIRATION_MINUTES,
        };

        let google = match (get("GOOGLE_CLIENT_ID"), get("GOOGLE_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(GoogleConfig {
                client_id,
                client_secret,
                redirect_url: get("GOOGLE_REDIRECT_URL")
                    .unwrap_or_else(|| DEFAULT_GOOGLE_REDIRECT_URL.to_string()),
            }),
            _ => None,
        };

        let cors_origins = get("CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            port: get("PORT").and_then(|p| p.parse().ok()).unwrap_or(8080),
            jwt_secret,
            jwt_expiration_min,
            google,
            cookie_secure: get("COOKIE_SECURE").is_some_and(|v| v.eq_ignore_ascii_case("true")),
            cors_origins,
        }
    }
}
