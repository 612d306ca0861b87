// src/services/csrf.rs
use oauth2::CsrfToken;

/// Per-attempt OAuth state: 16 random bytes, URL-safe base64.
pub fn generate_state() -> String {
    CsrfToken::new_random().secret().clone()
}
