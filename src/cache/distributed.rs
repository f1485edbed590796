//! Typed cache with single-flight fill

use super::options::{CacheEntryOptions, CacheOptions};
use super::serializer::{CacheSerializer, JsonCacheSerializer};
use super::store::CacheStore;
use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Typed view over a [`CacheStore`] under one cache name.
///
/// Backend failures never reach the caller: reads degrade to a miss and
/// writes, refreshes and removals to a no-op, with a warning logged.
pub struct DistributedCache<T, Z = JsonCacheSerializer> {
    name: String,
    store: Arc<dyn CacheStore>,
    serializer: Z,
    default_options: CacheEntryOptions,
    fill_lock: Mutex<()>,
    _item: PhantomData<fn() -> T>,
}

impl<T> DistributedCache<T, JsonCacheSerializer>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(name: impl Into<String>, store: Arc<dyn CacheStore>, options: &CacheOptions) -> Self {
        Self::with_serializer(name, store, options, JsonCacheSerializer)
    }
}

impl<T, Z> DistributedCache<T, Z>
where
    T: Serialize + DeserializeOwned + Send + Sync,
    Z: CacheSerializer,
{
    pub fn with_serializer(
        name: impl Into<String>,
        store: Arc<dyn CacheStore>,
        options: &CacheOptions,
        serializer: Z,
    ) -> Self {
        let name = name.into();
        let default_options = options.entry_options_for(&name);
        Self {
            name,
            store,
            serializer,
            default_options,
            fill_lock: Mutex::new(()),
            _item: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_options(&self) -> &CacheEntryOptions {
        &self.default_options
    }

    /// `c:<cache name>,k:<key>`
    pub fn normalize_key(&self, key: &str) -> String {
        format!("c:{},k:{}", self.name, key)
    }

    pub async fn get(&self, key: &str) -> Option<T> {
        let normalized = self.normalize_key(key);
        let bytes = match self.store.get(&normalized).await {
            Ok(bytes) => bytes?,
            Err(e) => {
                warn!("Cache read failed for {}: {:#}", normalized, e);
                return None;
            }
        };

        match self.serializer.deserialize(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Cache entry {} could not be decoded: {}", normalized, e);
                None
            }
        }
    }

    /// Return the cached value, or run `factory` and cache its result.
    ///
    /// Fills are serialized per cache instance: a miss takes the fill lock and
    /// checks again before calling the factory, so concurrent callers for the
    /// same missing key run the factory once. Factory errors are returned and
    /// nothing is cached.
    pub async fn get_or_add<F, Fut, E>(&self, key: &str, factory: F, options: Option<CacheEntryOptions>) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get(key).await {
            return Ok(value);
        }

        let _guard = self.fill_lock.lock().await;

        if let Some(value) = self.get(key).await {
            return Ok(value);
        }

        debug!("Cache miss for {}, filling", self.normalize_key(key));
        let value = factory().await?;
        self.set(key, &value, options).await;

        Ok(value)
    }

    pub async fn set(&self, key: &str, value: &T, options: Option<CacheEntryOptions>) {
        let normalized = self.normalize_key(key);
        let bytes = match self.serializer.serialize(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Cache entry {} could not be encoded: {}", normalized, e);
                return;
            }
        };

        let options = options.unwrap_or_else(|| self.default_options.clone());
        if let Err(e) = self.store.set(&normalized, bytes, &options).await {
            warn!("Cache write failed for {}: {:#}", normalized, e);
        }
    }

    pub async fn refresh(&self, key: &str) {
        let normalized = self.normalize_key(key);
        if let Err(e) = self.store.refresh(&normalized).await {
            warn!("Cache refresh failed for {}: {:#}", normalized, e);
        }
    }

    pub async fn remove(&self, key: &str) {
        let normalized = self.normalize_key(key);
        if let Err(e) = self.store.remove(&normalized).await {
            warn!("Cache remove failed for {}: {:#}", normalized, e);
        }
    }
}
