//! # Auth Module
//!
//! Accounts and authentication:
//! - password registration, login and password change
//! - Google OAuth sign-in with account linking by verified email
//! - JWT bearer tokens and the AuthedUser extractor for protected routes

pub mod cookies;
pub mod credentials;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod oauth;
pub mod routes;
pub mod store;
pub mod validators;


pub use extractors::AuthedUser;
pub use routes::auth_routes;
