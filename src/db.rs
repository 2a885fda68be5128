//! User store: one SQLite row per Telegram account, holding the thumbnail
//! reference, ban flag and first-seen metadata. Rows are never hard-deleted.

use std::sync::Arc;

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::{BotError, BotResult};
use crate::migrations;

/// Counters for the /stats admin command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    pub total_users: i64,
    pub banned_users: i64,
    pub users_with_thumbnail: i64,
}

#[derive(Clone)]
pub struct UserDb {
    pool: Arc<SqlitePool>,
}

impl UserDb {
    /// Connect to the database and bring the schema up to date
    pub async fn connect(database_url: &str) -> BotResult<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .map_err(|e| BotError::general(format!("Failed to connect to database: {}", e)))?;

        migrations::run_migrations(&pool).await?;

        Ok(Self::new(Arc::new(pool)))
    }

    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Record the user, refreshing their metadata. Returns true when this is
    /// the first time the bot sees them.
    pub async fn ensure_user(
        &self,
        user_id: i64,
        username: Option<&str>,
        first_name: Option<&str>,
    ) -> BotResult<bool> {
        let known = sqlx::query("SELECT 1 FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(self.pool.as_ref())
            .await?
            .is_some();

        if known {
            sqlx::query("UPDATE users SET username = ?, first_name = ? WHERE user_id = ?")
                .bind(username)
                .bind(first_name)
                .bind(user_id)
                .execute(self.pool.as_ref())
                .await?;
            return Ok(false);
        }

        sqlx::query(
            "INSERT INTO users (user_id, username, first_name, first_seen) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(username)
        .bind(first_name)
        .bind(Utc::now().timestamp())
        .execute(self.pool.as_ref())
        .await?;

        Ok(true)
    }

    pub async fn set_thumbnail(&self, user_id: i64, path: &str) -> BotResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, thumbnail_path, first_seen) VALUES (?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET thumbnail_path = excluded.thumbnail_path
            "#,
        )
        .bind(user_id)
        .bind(path)
        .bind(Utc::now().timestamp())
        .execute(self.pool.as_ref())
        .await?;

        log::info!("Thumbnail saved for user {}", user_id);
        Ok(())
    }

    pub async fn thumbnail(&self, user_id: i64) -> Option<String> {
        let result = sqlx::query("SELECT thumbnail_path FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(self.pool.as_ref())
            .await;

        match result {
            Ok(Some(row)) => row.get("thumbnail_path"),
            _ => None,
        }
    }

    pub async fn has_thumbnail(&self, user_id: i64) -> bool {
        self.thumbnail(user_id).await.is_some()
    }

    /// Returns true when there was a thumbnail to remove
    pub async fn remove_thumbnail(&self, user_id: i64) -> BotResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET thumbnail_path = NULL WHERE user_id = ? AND thumbnail_path IS NOT NULL",
        )
        .bind(user_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn ban(&self, user_id: i64, reason: Option<&str>) -> BotResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, banned, ban_reason, first_seen) VALUES (?, 1, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET banned = 1, ban_reason = excluded.ban_reason
            "#,
        )
        .bind(user_id)
        .bind(reason)
        .bind(Utc::now().timestamp())
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    /// Returns true when the user was actually banned before
    pub async fn unban(&self, user_id: i64) -> BotResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET banned = 0, ban_reason = NULL WHERE user_id = ? AND banned = 1",
        )
        .bind(user_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn is_banned(&self, user_id: i64) -> bool {
        let result = sqlx::query("SELECT banned FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(self.pool.as_ref())
            .await;

        match result {
            Ok(Some(row)) => row.get::<i64, _>("banned") != 0,
            _ => false,
        }
    }

    /// Every known account id, for broadcasts
    pub async fn user_ids(&self) -> BotResult<Vec<i64>> {
        let rows = sqlx::query("SELECT user_id FROM users")
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.iter().map(|row| row.get("user_id")).collect())
    }

    pub async fn stats(&self) -> BotResult<Stats> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total_users,
                COALESCE(SUM(banned), 0) AS banned_users,
                COUNT(thumbnail_path) AS users_with_thumbnail
            FROM users
            "#,
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(Stats {
            total_users: row.get("total_users"),
            banned_users: row.get("banned_users"),
            users_with_thumbnail: row.get("users_with_thumbnail"),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;

    // Single connection so the in-memory database is shared across queries
    async fn test_db() -> UserDb {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        UserDb::new(Arc::new(pool))
    }

    #[tokio::test]
    async fn first_contact_is_reported_once() {
        let db = test_db().await;

        assert!(db.ensure_user(42, Some("alice"), Some("Alice")).await.unwrap());
        assert!(!db.ensure_user(42, Some("alice2"), Some("Alice")).await.unwrap());
        assert_eq!(db.stats().await.unwrap().total_users, 1);
    }

    #[tokio::test]
    async fn thumbnail_lifecycle() {
        let db = test_db().await;
        db.ensure_user(42, None, None).await.unwrap();

        assert!(!db.has_thumbnail(42).await);
        assert!(!db.remove_thumbnail(42).await.unwrap());

        db.set_thumbnail(42, "thumbnails/42.jpg").await.unwrap();
        assert_eq!(db.thumbnail(42).await.as_deref(), Some("thumbnails/42.jpg"));

        assert!(db.remove_thumbnail(42).await.unwrap());
        assert!(!db.has_thumbnail(42).await);
    }

    #[tokio::test]
    async fn ban_works_even_for_unseen_users() {
        let db = test_db().await;

        assert!(!db.is_banned(7).await);
        db.ban(7, Some("spam")).await.unwrap();
        assert!(db.is_banned(7).await);

        assert!(db.unban(7).await.unwrap());
        assert!(!db.is_banned(7).await);
        assert!(!db.unban(7).await.unwrap());
    }

    #[tokio::test]
    async fn stats_count_each_dimension() {
        let db = test_db().await;
        db.ensure_user(1, None, None).await.unwrap();
        db.ensure_user(2, None, None).await.unwrap();
        db.ensure_user(3, None, None).await.unwrap();
        db.set_thumbnail(1, "thumbnails/1.jpg").await.unwrap();
        db.set_thumbnail(2, "thumbnails/2.jpg").await.unwrap();
        db.ban(3, None).await.unwrap();

        assert_eq!(
            db.stats().await.unwrap(),
            Stats {
                total_users: 3,
                banned_users: 1,
                users_with_thumbnail: 2,
            }
        );

        let mut ids = db.user_ids().await.unwrap();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
