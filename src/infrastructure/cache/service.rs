//! Cache service trait and error types.

use async_trait::async_trait;
use std::time::Duration;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Key-value cache with per-entry time-to-live.
///
/// The cache stores opaque byte payloads; callers own the encoding. It is
/// populated only after a store read (cache-aside) and never invalidated
/// proactively. Errors are returned to the caller, which decides whether to
/// degrade.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache
/// - [`crate::infrastructure::cache::MemoryCache`] - In-process TTL map
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Reads a payload.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(bytes))` on cache hit
    /// - `Ok(None)` when the key is absent or its TTL has lapsed
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Writes a payload that expires after `ttl`, replacing any existing entry.
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> CacheResult<()>;

    /// Checks if the cache backend is reachable.
    ///
    /// Used by the health endpoint to report cache status.
    async fn health_check(&self) -> bool;
}
