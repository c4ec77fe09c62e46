use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ses_core::{KeyValueStore, StorageError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// [`KeyValueStore`] backed by a single SQLite table.
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Opens the database named by `connection_string`.
    ///
    /// Accepts a bare file path (created if missing), a `sqlite:` URL, or
    /// `:memory:`. The pool holds a single connection so an in-memory
    /// database lives as long as the storage does.
    pub async fn new(connection_string: &str) -> Result<Self, StorageError> {
        let options = connect_options(connection_string)?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), StorageError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(format!("migration failed: {e}")))?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// When `key` was last written, or `None` if it is not stored.
    pub async fn last_updated(&self, key: &str) -> Result<Option<DateTime<Utc>>, StorageError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT updated_at FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Read(e.to_string()))?;

        row.map(|(s,)| parse_datetime(&s)).transpose()
    }
}

fn connect_options(connection_string: &str) -> Result<SqliteConnectOptions, StorageError> {
    let options = match connection_string {
        ":memory:" => SqliteConnectOptions::from_str("sqlite::memory:"),
        url if url.starts_with("sqlite:") => SqliteConnectOptions::from_str(url),
        path => Ok(SqliteConnectOptions::new().filename(path)),
    }
    .map_err(|e| {
        StorageError::Configuration(format!(
            "invalid sqlite connection string '{connection_string}': {e}"
        ))
    })?;

    Ok(options.create_if_missing(true))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StorageError> {
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|e| StorageError::Read(format!("Failed to parse datetime '{}': {}", s, e)))
}

#[async_trait]
impl KeyValueStore for SqliteStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let row: Option<(Vec<u8>,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Read(e.to_string()))?;

        Ok(row.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let now = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

        sqlx::query(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Write(e.to_string()))?;

        tracing::trace!(key, bytes = value.len(), "stored value");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Write(e.to_string()))?;

        Ok(())
    }
}
