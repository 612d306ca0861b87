//! Feed handlers. All of them require a bearer token.

use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::models::{CreateFeedRequest, Feed};
use super::validators::FeedValidator;
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState, Validator};

/// GET /api/feeds
pub async fn list_feeds(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
) -> Result<Json<Vec<Feed>>, ApiError> {
    let feeds = state
        .feeds
        .list_for_user(authed.id)
        .await
        .map_err(ApiError::DatabaseError)?;
    Ok(Json(feeds))
}

/// POST /api/feeds
///
/// # Request Body
/// ```json
/// { "title": "My Show", "url": "https://example.com/rss" }
/// ```
pub async fn create_feed(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Json(request): Json<CreateFeedRequest>,
) -> Result<(StatusCode, Json<Feed>), ApiError> {
    let validation_result = FeedValidator.validate(&request);
    if !validation_result.is_valid {
        warn!(
            user_id = %authed.id,
            errors = ?validation_result.errors,
            "Feed validation failed"
        );
        return Err(ApiError::from(validation_result));
    }

    let feed = state
        .feeds
        .create(authed.id, request.title.trim(), request.url.trim())
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(user_id = %authed.id, feed_id = %feed.id, "Feed created");
    Ok((StatusCode::CREATED, Json(feed)))
}

/// DELETE /api/feeds/:id
pub async fn delete_feed(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Path(feed_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .feeds
        .delete_for_user(authed.id, feed_id)
        .await
        .map_err(ApiError::DatabaseError)?;

    if !deleted {
        return Err(ApiError::NotFound("feed not found".to_string()));
    }

    info!(user_id = %authed.id, feed_id = %feed_id, "Feed deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/feeds/:id/sync
///
/// Only stamps `synced_at`; episodes are not fetched here.
pub async fn sync_feed(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
    Path(feed_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let synced = state
        .feeds
        .mark_synced(authed.id, feed_id)
        .await
        .map_err(ApiError::DatabaseError)?;

    if !synced {
        return Err(ApiError::NotFound("feed not found".to_string()));
    }

    info!(user_id = %authed.id, feed_id = %feed_id, "Feed sync requested");
    Ok(StatusCode::NO_CONTENT)
}
