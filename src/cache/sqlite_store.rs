//! SQLite-backed cache store, shared by every process pointing at the same file

use super::options::CacheEntryOptions;
use super::store::CacheStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::path::Path;

pub struct SqliteCacheStore {
    pool: SqlitePool,
}

impl SqliteCacheStore {
    /// Open (or create) the cache database at `db_path`
    pub async fn connect(db_path: &Path) -> Result<Self> {
        let database_url = format!("sqlite://{}?mode=rwc", db_path.display());

        let pool = SqlitePool::connect(&database_url)
            .await
            .with_context(|| format!("Failed to connect to cache database: {}", db_path.display()))?;

        sqlx::query("PRAGMA journal_mode = WAL")
            .execute(&pool)
            .await
            .context("Failed to enable WAL mode")?;

        log::debug!("Connected to cache database: {}", db_path.display());
        Self::with_pool(pool).await
    }

    /// Private in-memory database
    pub async fn connect_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("Failed to connect to in-memory cache database")?;

        Self::with_pool(pool).await
    }

    pub async fn with_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS cache_entries (
                cache_key TEXT PRIMARY KEY,
                value BLOB NOT NULL,
                absolute_expires_at TIMESTAMP,
                sliding_millis INTEGER,
                expires_at TIMESTAMP
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("Failed to create cache_entries table")?;

        Ok(Self { pool })
    }

    /// Delete every expired entry, returning how many were removed
    pub async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM cache_entries WHERE expires_at IS NOT NULL AND expires_at <= ?")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .context("Failed to purge expired cache entries")?;

        Ok(result.rows_affected())
    }

    async fn touch(&self, key: &str, absolute: Option<DateTime<Utc>>, sliding_millis: Option<i64>) -> Result<()> {
        let expires_at = next_expiry(Utc::now(), absolute, sliding_millis);

        sqlx::query("UPDATE cache_entries SET expires_at = ? WHERE cache_key = ?")
            .bind(expires_at)
            .bind(key)
            .execute(&self.pool)
            .await
            .context("Failed to extend cache entry")?;

        Ok(())
    }
}

/// Earliest of the absolute deadline and `now + sliding`
fn next_expiry(
    now: DateTime<Utc>,
    absolute: Option<DateTime<Utc>>,
    sliding_millis: Option<i64>,
) -> Option<DateTime<Utc>> {
    let sliding = sliding_millis.and_then(|millis| now.checked_add_signed(ChronoDuration::milliseconds(millis)));
    match (absolute, sliding) {
        (Some(a), Some(s)) => Some(a.min(s)),
        (a, s) => a.or(s),
    }
}

type EntryRow = (Vec<u8>, Option<DateTime<Utc>>, Option<i64>, Option<DateTime<Utc>>);

#[async_trait]
impl CacheStore for SqliteCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let row: Option<EntryRow> = sqlx::query_as(
            r#"
            SELECT value, absolute_expires_at, sliding_millis, expires_at
            FROM cache_entries
            WHERE cache_key = ?
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch cache entry")?;

        let Some((value, absolute, sliding_millis, expires_at)) = row else {
            return Ok(None);
        };

        if expires_at.is_some_and(|at| at <= Utc::now()) {
            self.remove(key).await?;
            return Ok(None);
        }

        if sliding_millis.is_some() {
            self.touch(key, absolute, sliding_millis).await?;
        }

        Ok(Some(value))
    }

    async fn set(&self, key: &str, value: Vec<u8>, options: &CacheEntryOptions) -> Result<()> {
        let now = Utc::now();
        let absolute = options
            .absolute_expiration
            .and_then(|d| ChronoDuration::from_std(d).ok())
            .map(|d| now + d);
        let sliding_millis = options
            .sliding_expiration
            .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX));

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO cache_entries (cache_key, value, absolute_expires_at, sliding_millis, expires_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(absolute)
        .bind(sliding_millis)
        .bind(next_expiry(now, absolute, sliding_millis))
        .execute(&self.pool)
        .await
        .context("Failed to set cache entry")?;

        Ok(())
    }

    async fn refresh(&self, key: &str) -> Result<()> {
        let row: Option<(Option<DateTime<Utc>>, Option<i64>)> = sqlx::query_as(
            "SELECT absolute_expires_at, sliding_millis FROM cache_entries WHERE cache_key = ?",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch cache entry")?;

        if let Some((absolute, sliding_millis @ Some(_))) = row {
            self.touch(key, absolute, sliding_millis).await?;
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM cache_entries WHERE cache_key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .context("Failed to delete cache entry")?;

        Ok(())
    }
}
