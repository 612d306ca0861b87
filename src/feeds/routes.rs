use super::handlers;
use axum::{
    routing::{delete, get, put},
    Router,
};

/// Creates the feeds router
pub fn feeds_routes() -> Router {
    Router::new()
        .route(
            "/api/feeds",
            get(handlers::list_feeds).post(handlers::create_feed),
        )
        .route("/api/feeds/:id", delete(handlers::delete_feed))
        .route("/api/feeds/:id/sync", put(handlers::sync_feed))
}
