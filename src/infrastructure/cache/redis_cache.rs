//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;
use tracing::{debug, info};

const KEY_PREFIX: &str = "snaplink:";

/// Redis cache for resolution snapshots.
///
/// Uses `ConnectionManager` for automatic reconnection; clones share one
/// multiplexed connection. Keys are namespaced with a fixed prefix.
pub struct RedisCache {
    client: ConnectionManager,
    key_prefix: String,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING fails.
    pub async fn connect(redis_url: &str) -> CacheResult<Self> {
        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            client: manager,
            key_prefix: KEY_PREFIX.to_string(),
        })
    }

    fn build_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let mut conn = self.client.clone();

        conn.get::<_, Option<Vec<u8>>>(self.build_key(key))
            .await
            .map_err(|e| CacheError::OperationError(format!("GET {}: {}", key, e)))
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> CacheResult<()> {
        let mut conn = self.client.clone();
        // SETEX rejects a zero TTL.
        let ttl_seconds = ttl.as_secs().max(1);

        conn.set_ex::<_, _, ()>(self.build_key(key), value, ttl_seconds)
            .await
            .map_err(|e| CacheError::OperationError(format!("SETEX {}: {}", key, e)))?;

        debug!(key, ttl_seconds, "Cache SET");
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
