//! In-process TTL cache.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

/// A [`CacheService`] backed by a process-local map.
///
/// Expired entries are evicted lazily on read. The cache can be switched into
/// an unavailable state, in which every call fails, to exercise degradation.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
    unavailable: AtomicBool,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail (or succeed again) with a connection error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Time left before `key` lapses, or `None` if it is absent or expired.
    pub async fn remaining_ttl(&self, key: &str) -> Option<Duration> {
        let entries = self.entries.lock().await;
        let entry = entries.get(key)?;
        entry.expires_at.checked_duration_since(Instant::now())
    }

    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .await
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_available(&self) -> CacheResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CacheError::ConnectionError("memory cache marked unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        self.check_available()?;

        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> CacheResult<()> {
        self.check_available()?;

        self.entries.lock().await.insert(
            key.to_string(),
            Entry {
                value: value.to_vec(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn health_check(&self) -> bool {
        self.check_available().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = MemoryCache::new();
        cache.set("k", b"v", Duration::from_secs(60)).await.unwrap();

        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some(&b"v"[..]));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_lapses_after_ttl() {
        let cache = MemoryCache::new();
        cache.set("k", b"v", Duration::from_secs(30)).await.unwrap();

        tokio::time::advance(Duration::from_secs(29)).await;
        assert!(cache.get("k").await.unwrap().is_some());
        assert_eq!(cache.remaining_ttl("k").await, Some(Duration::from_secs(1)));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get("k").await.unwrap().is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_set_replaces_existing_entry() {
        let cache = MemoryCache::new();
        cache.set("k", b"old", Duration::from_secs(60)).await.unwrap();
        cache.set("k", b"new", Duration::from_secs(60)).await.unwrap();

        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some(&b"new"[..]));
    }

    #[tokio::test]
    async fn test_unavailable_cache_errors() {
        let cache = MemoryCache::new();
        cache.set_unavailable(true);

        assert!(cache.get("k").await.is_err());
        assert!(cache.set("k", b"v", Duration::from_secs(1)).await.is_err());
        assert!(!cache.health_check().await);

        cache.set_unavailable(false);
        assert!(cache.health_check().await);
    }
}
