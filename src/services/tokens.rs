// src/services/tokens.rs
//! HS256 bearer tokens carrying the user id as `sub`.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_EXPIRATION_MINUTES: i64 = 10;

/// JWT claims structure
#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("invalid or expired token")]
    Invalid,

    #[error("token subject is not a valid user id")]
    InvalidSubject,
}

/// Sign a token for `user_id` that expires `expiration_minutes` from now.
pub fn issue_token(
    user_id: Uuid,
    secret: &str,
    expiration_minutes: i64,
) -> Result<String, TokenError> {
    let exp = (Utc::now() + Duration::minutes(expiration_minutes)).timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

/// Check signature and expiry, then parse the subject back into a user id.
pub fn verify_token(token: &str, secret: &str) -> Result<Uuid, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| TokenError::Invalid)?;

    Uuid::parse_str(&decoded.claims.sub).map_err(|_| TokenError::InvalidSubject)
}

/// Process-wide signing configuration.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: String,
    expiration_minutes: i64,
}

impl TokenIssuer {
    pub fn new(secret: impl Into<String>, expiration_minutes: i64) -> Self {
        Self {
            secret: secret.into(),
            expiration_minutes,
        }
    }

    pub fn issue(&self, user_id: Uuid) -> Result<String, TokenError> {
        issue_token(user_id, &self.secret, self.expiration_minutes)
    }

    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        verify_token(token, &self.secret)
    }

    pub fn expiration_minutes(&self) -> i64 {
        self.expiration_minutes
    }
}
