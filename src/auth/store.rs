//! User persistence

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use super::models::User;

const USER_COLUMNS: &str = "id, email, password_hash, google_id, created_at, updated_at";

#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique email or provider id already taken, typically by a concurrent request.
    #[error("record violates a uniqueness constraint")]
    Conflict,

    #[error("record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Users keyed by id, with unique email and unique optional Google id.
///
/// Records are returned by value; writes return the stored row.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, StoreError>;
    async fn find_all(&self) -> Result<Vec<User>, StoreError>;
    /// Password account.
    async fn create(&self, email: &str, password_hash: &str) -> Result<User, StoreError>;
    /// Provider-only account, no password hash.
    async fn create_oauth_user(&self, email: &str, google_id: &str) -> Result<User, StoreError>;
    async fn update(&self, user: &User) -> Result<User, StoreError>;
    async fn update_google_id(&self, id: Uuid, google_id: &str) -> Result<User, StoreError>;
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

fn map_write_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            debug!(error = %db.message(), "Unique constraint violated on users");
            StoreError::Conflict
        }
        _ => StoreError::Database(err),
    }
}

pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, google_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(user.password_hash.as_deref())
        .bind(user.google_id.as_deref())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(())
    }

    fn new_user(email: &str, password_hash: Option<&str>, google_id: Option<&str>) -> User {
        let now = Utc::now();
        User {
            id: Uuid::now_v7(),
            email: email.to_string(),
            password_hash: password_hash.map(str::to_string),
            google_id: google_id.map(str::to_string),
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE google_id = ?",
            USER_COLUMNS
        ))
        .bind(google_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY created_at",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn create(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let user = Self::new_user(email, Some(password_hash), None);
        self.insert(&user).await?;
        Ok(user)
    }

    async fn create_oauth_user(&self, email: &str, google_id: &str) -> Result<User, StoreError> {
        let user = Self::new_user(email, None, Some(google_id));
        self.insert(&user).await?;
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, StoreError> {
        let updated = User {
            updated_at: Utc::now(),
            ..user.clone()
        };

        let result = sqlx::query(
            "UPDATE users SET email = ?, password_hash = ?, google_id = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&updated.email)
        .bind(updated.password_hash.as_deref())
        .bind(updated.google_id.as_deref())
        .bind(updated.updated_at)
        .bind(updated.id)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(updated)
    }

    async fn update_google_id(&self, id: Uuid, google_id: &str) -> Result<User, StoreError> {
        let result = sqlx::query("UPDATE users SET google_id = ?, updated_at = ? WHERE id = ?")
            .bind(google_id)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        self.find_by_id(id).await?.ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_support::memory_pool;

    async fn store() -> SqliteUserStore {
        SqliteUserStore::new(memory_pool().await)
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = store().await;
        let created = store.create("a@b.com", "hash").await.expect("create");

        let by_id = store.find_by_id(created.id).await.expect("query");
        let by_email = store.find_by_email("a@b.com").await.expect("query");

        assert_eq!(by_id.as_ref().map(|u| u.id), Some(created.id));
        assert_eq!(by_email.map(|u| u.id), Some(created.id));
        assert_eq!(by_id.and_then(|u| u.password_hash), Some("hash".to_string()));
    }

    #[tokio::test]
    async fn test_missing_user_is_none() {
        let store = store().await;
        assert!(store.find_by_id(Uuid::now_v7()).await.expect("query").is_none());
        assert!(store.find_by_google_id("g-unknown").await.expect("query").is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let store = store().await;
        store.create("a@b.com", "hash").await.expect("create");

        let second = store.create("a@b.com", "other").await;
        assert!(matches!(second, Err(StoreError::Conflict)));

        let oauth = store.create_oauth_user("a@b.com", "g1").await;
        assert!(matches!(oauth, Err(StoreError::Conflict)));
    }

    #[tokio::test]
    async fn test_duplicate_google_id_is_conflict() {
        let store = store().await;
        store.create_oauth_user("a@b.com", "g1").await.expect("create");

        let second = store.create_oauth_user("c@d.com", "g1").await;
        assert!(matches!(second, Err(StoreError::Conflict)));
    }

    #[tokio::test]
    async fn test_oauth_user_has_no_password() {
        let store = store().await;
        let user = store.create_oauth_user("a@b.com", "g1").await.expect("create");

        let found = store.find_by_google_id("g1").await.expect("query").expect("user");
        assert_eq!(found.id, user.id);
        assert!(!found.has_password());
    }

    #[tokio::test]
    async fn test_update_google_id_links_existing_account() {
        let store = store().await;
        let user = store.create("a@b.com", "hash").await.expect("create");

        let linked = store.update_google_id(user.id, "g1").await.expect("link");

        assert_eq!(linked.id, user.id);
        assert_eq!(linked.google_id.as_deref(), Some("g1"));
        assert_eq!(linked.password_hash.as_deref(), Some("hash"));
    }

    #[tokio::test]
    async fn test_update_replaces_password_hash() {
        let store = store().await;
        let user = store.create("a@b.com", "old").await.expect("create");

        let changed = User {
            password_hash: Some("new".to_string()),
            ..user.clone()
        };
        store.update(&changed).await.expect("update");

        let found = store.find_by_id(user.id).await.expect("query").expect("user");
        assert_eq!(found.password_hash.as_deref(), Some("new"));
        assert!(found.updated_at >= user.updated_at);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_user() {
        let store = store().await;
        let ghost = SqliteUserStore::new_user("ghost@b.com", Some("hash"), None);

        assert!(matches!(store.update(&ghost).await, Err(StoreError::NotFound)));
        assert!(matches!(store.delete(ghost.id).await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_delete_and_find_all() {
        let store = store().await;
        let first = store.create("a@b.com", "hash").await.expect("create");
        store.create_oauth_user("c@d.com", "g1").await.expect("create");

        assert_eq!(store.find_all().await.expect("list").len(), 2);
        store.delete(first.id).await.expect("delete");
        assert_eq!(store.find_all().await.expect("list").len(), 1);
    }
}
