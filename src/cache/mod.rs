//! Reference-data cache
//!
//! [`DistributedCache`] is a typed, single-flight layer over a byte-level
//! [`CacheStore`]. Two stores ship with the crate: an in-process map and a
//! SQLite table.

pub mod distributed;
pub mod options;
pub mod serializer;
pub mod sqlite_store;
pub mod store;

pub use distributed::DistributedCache;
pub use options::{CacheEntryOptions, CacheOptions};
pub use serializer::{CacheSerializer, JsonCacheSerializer};
pub use sqlite_store::SqliteCacheStore;
pub use store::{CacheStore, MemoryCacheStore};
