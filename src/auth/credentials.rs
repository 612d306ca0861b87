//! Password registration, login and password change

use std::sync::{Arc, OnceLock};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::error::AuthError;
use super::models::User;
use super::store::{StoreError, UserStore};
use crate::common::safe_email_log;
use crate::services::password;
use crate::services::TokenIssuer;

/// Emails are compared case-insensitively everywhere accounts are looked up.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct CredentialService {
    store: Arc<dyn UserStore>,
    tokens: TokenIssuer,
}

impl CredentialService {
    pub fn new(store: Arc<dyn UserStore>, tokens: TokenIssuer) -> Self {
        Self { store, tokens }
    }

    /// Creates a password account. Store errors (duplicate email included) pass through.
    pub async fn register(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = normalize_email(email);
        let hash = hash_blocking(password.to_string()).await?;

        let user = self.store.create(&email, &hash).await.map_err(|e| {
            warn!(error = %e, email = %safe_email_log(&email), "User registration failed");
            AuthError::from(e)
        })?;

        info!(user_id = %user.id, email = %safe_email_log(&email), "User registered");
        Ok(user)
    }

    /// Returns a bearer token on success.
    ///
    /// Unknown email, password-less account and wrong password are all `InvalidPassword`,
    /// and each runs exactly one Argon2 verification.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let email = normalize_email(email);
        let user = self.store.find_by_email(&email).await?;

        let (user, hash) = match user {
            Some(user) => match user.password_hash.clone() {
                Some(hash) => (user, hash),
                None => {
                    debug!(user_id = %user.id, "Password login attempted on OAuth-only account");
                    burn_verification(password.to_string()).await;
                    return Err(AuthError::InvalidPassword);
                }
            },
            None => {
                debug!(email = %safe_email_log(&email), "Login attempted for unknown email");
                burn_verification(password.to_string()).await;
                return Err(AuthError::InvalidPassword);
            }
        };

        match verify_blocking(password.to_string(), hash).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(user_id = %user.id, "Login failed: password mismatch");
                return Err(AuthError::InvalidPassword);
            }
            Err(e) => {
                error!(user_id = %user.id, error = %e, "Stored password hash could not be verified");
                return Err(AuthError::InvalidPassword);
            }
        }

        let token = self.tokens.issue(user.id)?;
        info!(user_id = %user.id, "User logged in");
        Ok(token)
    }

    pub async fn update_password(
        &self,
        user_id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let Some(current_hash) = user.password_hash.clone() else {
            warn!(user_id = %user_id, "Password change attempted on OAuth-only account");
            return Err(AuthError::NoPassword);
        };

        if !verify_blocking(old_password.to_string(), current_hash).await? {
            warn!(user_id = %user_id, "Password change failed: old password mismatch");
            return Err(AuthError::InvalidPassword);
        }

        let new_hash = hash_blocking(new_password.to_string()).await?;
        self.store
            .update(&User {
                password_hash: Some(new_hash),
                ..user
            })
            .await?;

        info!(user_id = %user_id, "Password updated");
        Ok(())
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<User, AuthError> {
        self.store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    pub async fn delete_user(&self, user_id: Uuid) -> Result<(), AuthError> {
        match self.store.delete(user_id).await {
            Ok(()) => {
                info!(user_id = %user_id, "User deleted");
                Ok(())
            }
            Err(StoreError::NotFound) => Err(AuthError::UserNotFound),
            Err(e) => Err(e.into()),
        }
    }
}

async fn hash_blocking(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(AuthError::from)
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(AuthError::from)
}

fn dummy_hash() -> Option<&'static str> {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();
    DUMMY_HASH
        .get_or_init(|| password::hash_password("timing-equalization").ok())
        .as_deref()
}

/// One throwaway verification so failed lookups cost the same as a wrong password.
async fn burn_verification(password: String) {
    let _ = tokio::task::spawn_blocking(move || {
        if let Some(hash) = dummy_hash() {
            let _ = password::verify_password(&password, hash);
        }
    })
    .await;
}
