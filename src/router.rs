// src/router.rs
//! Route composition shared by the binary and the router tests

use axum::{extract::Extension, middleware, Router};
use std::sync::Arc;

use crate::common::AppState;
use crate::{auth, feeds, logging_middleware};

/// All API routes with the shared state attached. CORS and HTTP tracing are added by `main`.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(auth::auth_routes())
        .merge(feeds::feeds_routes())
        // Add request/response body logging in debug mode
        .layer(middleware::from_fn(logging_middleware::log_request_response))
        .layer(Extension(state))
}
