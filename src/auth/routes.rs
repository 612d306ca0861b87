//! Authentication routes

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /api/user/register` - Create a password account
/// - `POST /api/user/login` - Exchange credentials for a token
/// - `PUT /api/user/password` - Change the caller's password
/// - `GET /api/user/me` - Current user information
/// - `DELETE /api/user` - Delete the caller's account
/// - `GET /api/auth/google` - Start Google OAuth
/// - `GET /api/auth/google/callback` - Finish Google OAuth
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/user/register", post(handlers::register_handler))
        .route("/api/user/login", post(handlers::login_handler))
        .route("/api/user/password", put(handlers::update_password_handler))
        .route("/api/user/me", get(handlers::me_handler))
        .route("/api/user", delete(handlers::delete_user_handler))
        .route("/api/auth/google", get(handlers::google_oauth_start))
        .route(
            "/api/auth/google/callback",
            get(handlers::google_oauth_callback),
        )
}
