//! Auth service errors

use thiserror::Error;

use super::store::StoreError;
use crate::services::password::PasswordError;
use crate::services::tokens::TokenError;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email, wrong password and password-less account all report this.
    #[error("invalid email or password")]
    InvalidPassword,

    #[error("user not found")]
    UserNotFound,

    #[error("account has no password")]
    NoPassword,

    #[error("Google OAuth is not configured")]
    GoogleNotConfigured,

    #[error("failed to exchange authorization code")]
    FailedExchange,

    #[error("failed to fetch user info from Google")]
    FailedUserInfo,

    #[error("email not verified by Google")]
    UnverifiedEmail,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("token subject is not a valid user id")]
    InvalidSubject,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("token signing failed: {0}")]
    Signing(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(e) => AuthError::Signing(e.to_string()),
            TokenError::Invalid => AuthError::InvalidToken,
            TokenError::InvalidSubject => AuthError::InvalidSubject,
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        AuthError::Hashing(err.to_string())
    }
}
