use serde::Serialize;
use serde::de::DeserializeOwned;

/// Conversion between cache items and stored bytes
pub trait CacheSerializer: Send + Sync {
    fn serialize<T: Serialize>(&self, value: &T) -> serde_json::Result<Vec<u8>>;

    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> serde_json::Result<T>;
}

/// UTF-8 JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCacheSerializer;

impl CacheSerializer for JsonCacheSerializer {
    fn serialize<T: Serialize>(&self, value: &T) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(value)
    }

    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> serde_json::Result<T> {
        serde_json::from_slice(bytes)
    }
}
