//! Byte-level cache backends

use super::options::CacheEntryOptions;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Key-value store holding serialized cache entries
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    async fn set(&self, key: &str, value: Vec<u8>, options: &CacheEntryOptions) -> Result<()>;

    /// Reset the sliding expiration of an entry without reading it
    async fn refresh(&self, key: &str) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: Vec<u8>,
    absolute_deadline: Option<Instant>,
    sliding: Option<Duration>,
    last_access: Instant,
}

impl MemoryEntry {
    fn is_expired(&self, now: Instant) -> bool {
        if self.absolute_deadline.is_some_and(|deadline| now >= deadline) {
            return true;
        }
        self.sliding
            .is_some_and(|sliding| now.duration_since(self.last_access) >= sliding)
    }
}

/// In-process store; expired entries are dropped lazily on access
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, MemoryEntry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .await
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        match entries.get_mut(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => {
                entry.last_access = now;
                Ok(Some(entry.value.clone()))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>, options: &CacheEntryOptions) -> Result<()> {
        let now = Instant::now();
        let entry = MemoryEntry {
            value,
            absolute_deadline: options.absolute_expiration.map(|d| now + d),
            sliding: options.sliding_expiration,
            last_access: now,
        };
        self.entries.lock().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn refresh(&self, key: &str) -> Result<()> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.get_mut(key) {
            if entry.is_expired(now) {
                entries.remove(key);
            } else {
                entry.last_access = now;
            }
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
