//! Short-TTL key/value cache.
//!
//! Values are strings with an absolute expiry set at write time. Reads never
//! extend a TTL. Typed JSON access goes through [`CacheExt`].

pub mod error;
pub mod memory;
pub mod redis_cache;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::warn;

pub use error::{CacheError, CacheResult};
pub use memory::MemoryCache;
pub use redis_cache::RedisCache;

#[async_trait]
pub trait Cache: Send + Sync {
    /// Live value for `key`, if any.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Store `value`, replacing any previous entry, expiring `ttl` from now.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()>;

    /// Backend name for logs and metrics.
    fn name(&self) -> &'static str;
}

/// JSON helpers over any [`Cache`].
///
/// Backend and decode failures are logged and reported as a miss, so a broken
/// cache degrades to recomputing.
#[async_trait]
pub trait CacheExt: Cache {
    async fn get_json<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned + Send,
    {
        let raw = match self.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                record_lookup(self.name(), false);
                return None;
            }
            Err(e) => {
                warn!(cache = self.name(), key, error = %e, "Cache read failed");
                record_lookup(self.name(), false);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                record_lookup(self.name(), true);
                Some(value)
            }
            Err(e) => {
                warn!(cache = self.name(), key, error = %e, "Discarding undecodable cache entry");
                record_lookup(self.name(), false);
                None
            }
        }
    }

    /// Best-effort write. Returns whether the value was stored.
    async fn set_json<T>(&self, key: &str, value: &T, ttl: Duration) -> bool
    where
        T: Serialize + Sync,
    {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(cache = self.name(), key, error = %e, "Cache value not serializable");
                return false;
            }
        };

        match self.set(key, raw, ttl).await {
            Ok(()) => true,
            Err(e) => {
                warn!(cache = self.name(), key, error = %e, "Cache write failed");
                false
            }
        }
    }
}

impl<C: Cache + ?Sized> CacheExt for C {}

fn record_lookup(cache: &'static str, hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    metrics::counter!("yv_cache_lookups_total", "cache" => cache, "result" => result)
        .increment(1);
}
