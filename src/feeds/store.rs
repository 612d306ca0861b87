//! SQLite access for feeds. Every query is scoped by owner.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::models::Feed;

const FEED_COLUMNS: &str = "id, user_id, title, url, synced_at, created_at, updated_at";

pub struct FeedStore {
    pool: SqlitePool,
}

impl FeedStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Feed>, sqlx::Error> {
        sqlx::query_as::<_, Feed>(&format!(
            "SELECT {} FROM feeds WHERE user_id = ? ORDER BY created_at, id",
            FEED_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn create(&self, user_id: Uuid, title: &str, url: &str) -> Result<Feed, sqlx::Error> {
        let now = Utc::now();
        let feed = Feed {
            id: Uuid::now_v7(),
            user_id,
            title: title.to_string(),
            url: url.to_string(),
            synced_at: None,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO feeds (id, user_id, title, url, synced_at, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(feed.id)
        .bind(feed.user_id)
        .bind(&feed.title)
        .bind(&feed.url)
        .bind(feed.synced_at)
        .bind(feed.created_at)
        .bind(feed.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(feed)
    }

    /// `false` when no feed with that id belongs to `user_id`.
    pub async fn delete_for_user(&self, user_id: Uuid, feed_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM feeds WHERE id = ? AND user_id = ?")
            .bind(feed_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Records a sync request. `false` when the feed is not the caller's.
    pub async fn mark_synced(&self, user_id: Uuid, feed_id: Uuid) -> Result<bool, sqlx::Error> {
        let now = Utc::now();
        let result =
            sqlx::query("UPDATE feeds SET synced_at = ?, updated_at = ? WHERE id = ? AND user_id = ?")
                .bind(now)
                .bind(now)
                .bind(feed_id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
