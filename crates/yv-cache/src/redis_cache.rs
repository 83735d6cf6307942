//! Redis cache backend.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;

use crate::error::CacheResult;
use crate::Cache;

/// Cache shared by every API instance through Redis.
#[derive(Clone)]
pub struct RedisCache {
    client: redis::Client,
    prefix: String,
}

impl RedisCache {
    /// Create a cache; keys are stored as `<prefix><key>`.
    pub fn new(redis_url: &str, prefix: impl Into<String>) -> CacheResult<Self> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self {
            client,
            prefix: prefix.into(),
        })
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Round-trip check for readiness probes.
    pub async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(self.full_key(key)).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let ttl_ms = ttl.as_millis().clamp(1, u64::MAX as u128) as u64;

        let _: () = redis::cmd("SET")
            .arg(self.full_key(key))
            .arg(value)
            .arg("PX")
            .arg(ttl_ms)
            .query_async(&mut conn)
            .await?;

        debug!(key, ttl_ms, "Cached value in Redis");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
