// src/services/mod.rs
//
// Leaf services used by the auth module: hashing, signing, OAuth provider access.

pub mod csrf;
pub mod google;
pub mod password;
pub mod tokens;

pub use google::{GoogleProvider, OAuthProvider};
pub use tokens::TokenIssuer;
