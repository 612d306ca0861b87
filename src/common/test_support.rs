//! Shared fixtures for unit and router tests

use async_trait::async_trait;
use axum::{
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use reqwest::Client;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::config::AppConfig;
use super::migrations::run_migrations;
use super::state::AppState;
use crate::auth::models::User;
use crate::auth::store::{StoreError, UserStore};
use crate::services::google::{bearer_client, OAuthProvider, ProviderError};

pub const TEST_SECRET: &str = "test_secret_key";
pub const TEST_ACCESS_TOKEN: &str = "test-access-token";

/// Single-connection in-memory SQLite with the schema applied.
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    run_migrations(&pool).await.expect("migrations");
    pool
}

pub fn test_config() -> AppConfig {
    let vars: HashMap<&str, &str> = HashMap::from([("JWT_SECRET", TEST_SECRET)]);
    AppConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
}

pub async fn test_state(
    provider: Option<Arc<dyn OAuthProvider>>,
    userinfo_url: Option<&str>,
) -> Arc<AppState> {
    let pool = memory_pool().await;
    let config = test_config();
    let state = match userinfo_url {
        Some(url) => AppState::with_userinfo_url(pool, &config, provider, url),
        None => AppState::new(pool, &config, provider),
    };
    Arc::new(state)
}

/// In-memory store enforcing the same uniqueness rules as the users table.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
    pub writes: AtomicUsize,
}

impl MemoryUserStore {
    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }

    pub async fn count(&self) -> usize {
        self.users.read().await.len()
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }

    fn taken(
        users: &HashMap<Uuid, User>,
        except: Uuid,
        email: &str,
        google_id: Option<&str>,
    ) -> bool {
        users.values().filter(|u| u.id != except).any(|u| {
            u.email == email || (google_id.is_some() && u.google_id.as_deref() == google_id)
        })
    }

    async fn create_user(
        &self,
        email: &str,
        password_hash: Option<&str>,
        google_id: Option<&str>,
    ) -> Result<User, StoreError> {
        self.record_write();
        let mut users = self.users.write().await;
        if Self::taken(&users, Uuid::nil(), email, google_id) {
            return Err(StoreError::Conflict);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            email: email.to_string(),
            password_hash: password_hash.map(str::to_string),
            google_id: google_id.map(str::to_string),
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.google_id.as_deref() == Some(google_id))
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.read().await.values().cloned().collect())
    }

    async fn create(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        self.create_user(email, Some(password_hash), None).await
    }

    async fn create_oauth_user(&self, email: &str, google_id: &str) -> Result<User, StoreError> {
        self.create_user(email, None, Some(google_id)).await
    }

    async fn update(&self, user: &User) -> Result<User, StoreError> {
        self.record_write();
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(StoreError::NotFound);
        }
        if Self::taken(&users, user.id, &user.email, user.google_id.as_deref()) {
            return Err(StoreError::Conflict);
        }
        let updated = User {
            updated_at: Utc::now(),
            ..user.clone()
        };
        users.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn update_google_id(&self, id: Uuid, google_id: &str) -> Result<User, StoreError> {
        let current = self.find_by_id(id).await?.ok_or(StoreError::NotFound)?;
        self.update(&User {
            google_id: Some(google_id.to_string()),
            ..current
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.record_write();
        match self.users.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }
}

/// Provider double: fixed consent URL, exchange succeeds only for `valid_code`.
pub struct FakeProvider {
    pub auth_url: String,
    pub valid_code: String,
    pub exchanges: AtomicUsize,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self {
            auth_url: "https://accounts.example.com/o/oauth2/auth".to_string(),
            valid_code: "good-code".to_string(),
            exchanges: AtomicUsize::new(0),
        }
    }

    pub fn exchange_count(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OAuthProvider for FakeProvider {
    fn build_auth_url(&self, state: &str) -> String {
        format!("{}?client_id=test-client&state={}", self.auth_url, state)
    }

    async fn exchange_code(&self, code: &str) -> Result<String, ProviderError> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        if code == self.valid_code {
            Ok(TEST_ACCESS_TOKEN.to_string())
        } else {
            Err(ProviderError::Exchange)
        }
    }

    fn authenticated_client(&self, access_token: &str) -> Result<Client, ProviderError> {
        bearer_client(access_token)
    }
}

/// Serves `body` with `status` at `/userinfo` to requests bearing [`TEST_ACCESS_TOKEN`].
pub async fn spawn_profile_server(status: StatusCode, body: serde_json::Value) -> String {
    let app = Router::new().route(
        "/userinfo",
        get(move |headers: HeaderMap| {
            let body = body.clone();
            async move {
                let expected = format!("Bearer {}", TEST_ACCESS_TOKEN);
                let authorized = headers
                    .get(AUTHORIZATION)
                    .and_then(|h| h.to_str().ok())
                    .map_or(false, |h| h == expected);
                if !authorized {
                    return (
                        StatusCode::UNAUTHORIZED,
                        Json(serde_json::json!({ "error": "unauthorized" })),
                    );
                }
                (status, Json(body))
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    format!("http://{}/userinfo", addr)
}

pub fn google_profile(id: &str, email: &str, verified: bool) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "email": email,
        "verified_email": verified,
        "name": "Test User",
        "picture": "https://example.com/avatar.jpg",
    })
}
