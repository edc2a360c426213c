//! SQLite-backed token store.
//!
//! One table, `user_tokens`, holding a single row per web session. Rows are
//! replaced wholesale on authorization-code exchange and updated in place on
//! refresh.

use chrono::{DateTime, Utc};
use sqlx::{
    Row, SqlitePool,
    sqlite::{SqlitePoolOptions, SqliteRow},
};

use crate::types::TokenRecord;

#[derive(Debug, Clone)]
pub struct TokenStore {
    pool: SqlitePool,
}

impl TokenStore {
    /// Connects to the database at `database_url`. In-memory URLs get the
    /// same single-connection pool as [`TokenStore::in_memory`].
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        if database_url.contains(":memory:") {
            return Self::in_memory().await;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Opens a private in-memory database.
    ///
    /// The pool is pinned to a single, never-recycled connection because every
    /// SQLite connection to `:memory:` sees its own database.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Ok(Self { pool })
    }

    /// Creates the `user_tokens` table if it does not exist yet.
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_tokens (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id    TEXT NOT NULL UNIQUE,
                access_token  TEXT NOT NULL,
                refresh_token TEXT,
                expires_at    TEXT NOT NULL,
                created_at    TEXT NOT NULL,
                updated_at    TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Looks up the record of a session.
    ///
    /// # Arguments
    ///
    /// * `session_id` - Identifier of the web session
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the session has never completed a code exchange or has
    /// logged out since.
    pub async fn find(&self, session_id: &str) -> Result<Option<TokenRecord>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT session_id, access_token, refresh_token, expires_at, created_at, updated_at
            FROM user_tokens
            WHERE session_id = ?
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| record_from_row(&r)).transpose()
    }

    /// Removes any record for the session and inserts `record` in its place.
    pub async fn replace(&self, record: &TokenRecord) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM user_tokens WHERE session_id = ?")
            .bind(&record.session_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO user_tokens
                (session_id, access_token, refresh_token, expires_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.session_id)
        .bind(&record.access_token)
        .bind(&record.refresh_token)
        .bind(record.expires_at)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await
    }

    /// Stores the result of a refresh. A `None` refresh token keeps the one
    /// already on file. Returns false when the session has no record.
    pub async fn update_refreshed(
        &self,
        session_id: &str,
        access_token: &str,
        refresh_token: Option<&str>,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE user_tokens
            SET access_token = ?,
                refresh_token = COALESCE(?, refresh_token),
                expires_at = ?,
                updated_at = ?
            WHERE session_id = ?
            "#,
        )
        .bind(access_token)
        .bind(refresh_token)
        .bind(expires_at)
        .bind(Utc::now())
        .bind(session_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes the record of a session. Returns whether one existed.
    pub async fn delete(&self, session_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_tokens WHERE session_id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every record regardless of session.
    pub async fn delete_all(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_tokens")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Returns every stored record, most recently updated first.
    ///
    /// Only used by the `sessions` CLI command; the service never enumerates
    /// sessions.
    pub async fn list(&self) -> Result<Vec<TokenRecord>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT session_id, access_token, refresh_token, expires_at, created_at, updated_at
            FROM user_tokens
            ORDER BY updated_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(record_from_row).collect()
    }

    /// Number of stored records.
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let row = sqlx::query("SELECT COUNT(*) FROM user_tokens")
            .fetch_one(&self.pool)
            .await?;

        row.try_get(0)
    }
}

fn record_from_row(row: &SqliteRow) -> Result<TokenRecord, sqlx::Error> {
    Ok(TokenRecord {
        session_id: row.try_get("session_id")?,
        access_token: row.try_get("access_token")?,
        refresh_token: row.try_get("refresh_token")?,
        expires_at: row.try_get("expires_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn record(session_id: &str, access: &str, refresh: Option<&str>) -> TokenRecord {
        let now = Utc::now();
        TokenRecord {
            session_id: session_id.to_string(),
            access_token: access.to_string(),
            refresh_token: refresh.map(str::to_string),
            expires_at: now + Duration::hours(1),
            created_at: now,
            updated_at: now,
        }
    }

    async fn store() -> TokenStore {
        let store = TokenStore::in_memory().await.unwrap();
        store.migrate().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_find_missing_session() {
        let store = store().await;
        assert!(store.find("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replace_keeps_a_single_row_per_session() {
        let store = store().await;

        store.replace(&record("s1", "A1", Some("R1"))).await.unwrap();
        store.replace(&record("s1", "A2", Some("R2"))).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let found = store.find("s1").await.unwrap().unwrap();
        assert_eq!(found.access_token, "A2");
        assert_eq!(found.refresh_token.as_deref(), Some("R2"));
    }

    #[tokio::test]
    async fn test_round_trips_timestamps() {
        let store = store().await;
        let original = record("s1", "A1", None);
        store.replace(&original).await.unwrap();

        let found = store.find("s1").await.unwrap().unwrap();
        assert_eq!(found.expires_at, original.expires_at);
        assert_eq!(found.created_at, original.created_at);
        assert!(found.refresh_token.is_none());
    }

    #[tokio::test]
    async fn test_update_refreshed_preserves_refresh_token_when_absent() {
        let store = store().await;
        let original = record("s1", "A1", Some("R1"));
        store.replace(&original).await.unwrap();

        let new_expiry = Utc::now() + Duration::seconds(3600);
        let updated = store
            .update_refreshed("s1", "A2", None, new_expiry)
            .await
            .unwrap();
        assert!(updated);

        let found = store.find("s1").await.unwrap().unwrap();
        assert_eq!(found.access_token, "A2");
        assert_eq!(found.refresh_token.as_deref(), Some("R1"));
        assert_eq!(found.expires_at, new_expiry);
        assert_eq!(found.created_at, original.created_at);
        assert!(found.updated_at >= original.updated_at);
    }

    #[tokio::test]
    async fn test_update_refreshed_rotates_refresh_token() {
        let store = store().await;
        store.replace(&record("s1", "A1", Some("R1"))).await.unwrap();

        store
            .update_refreshed("s1", "A2", Some("R2"), Utc::now())
            .await
            .unwrap();

        let found = store.find("s1").await.unwrap().unwrap();
        assert_eq!(found.refresh_token.as_deref(), Some("R2"));
    }

    #[tokio::test]
    async fn test_update_refreshed_unknown_session() {
        let store = store().await;
        let updated = store
            .update_refreshed("ghost", "A", None, Utc::now())
            .await
            .unwrap();
        assert!(!updated);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_and_delete_all() {
        let store = store().await;
        for id in ["s1", "s2", "s3"] {
            store.replace(&record(id, "A", Some("R"))).await.unwrap();
        }

        assert!(store.delete("s1").await.unwrap());
        assert!(!store.delete("s1").await.unwrap());
        assert_eq!(store.count().await.unwrap(), 2);

        assert_eq!(store.delete_all().await.unwrap(), 2);
        assert!(store.list().await.unwrap().is_empty());
    }
}
