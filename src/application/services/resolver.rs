//! Cache-aside resolution of short codes.
//!
//! A lookup moves through these stages:
//!
//! 1. **Cache lookup** by `link:{code}`. An absent key, a backend error, a
//!    timeout or an undecodable payload all count as a miss.
//! 2. **Store fallback** on miss: one transaction, point lookup, commit.
//!    Nothing found rolls back and ends in [`AppError::NotFound`].
//! 3. **Cache repopulate** with a fixed TTL that ignores the link's own
//!    expiry. A failed write is logged and the resolution continues.
//! 4. **Expiry check** against the snapshot, whatever its source.
//! 5. **Click dispatch** to the background queue, without waiting.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tokio::time::timeout;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::application::services::with_store_timeout;
use crate::domain::click_event::{ClickDispatcher, ClickEvent, RequestMeta};
use crate::domain::entities::CachedLink;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;

/// Cache key under which a short code's snapshot is stored.
pub fn cache_key(code: &str) -> String {
    format!("link:{code}")
}

/// Where a resolution's snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    Cache,
    Store,
}

/// A successful resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub long_url: String,
    pub link_id: Uuid,
    pub source: ResolutionSource,
}

/// Timing knobs for the resolver.
#[derive(Debug, Clone, Copy)]
pub struct ResolverSettings {
    /// Lifetime of a repopulated cache entry.
    pub cache_ttl: Duration,
    pub cache_timeout: Duration,
    pub store_timeout: Duration,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(30 * 60),
            cache_timeout: Duration::from_millis(250),
            store_timeout: Duration::from_secs(2),
        }
    }
}

/// Resolves short codes to long URLs.
///
/// The cache is never invalidated here: a deleted link keeps resolving from
/// its cached snapshot until the entry's TTL lapses.
pub struct Resolver {
    links: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    clicks: ClickDispatcher,
    settings: ResolverSettings,
}

impl Resolver {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        clicks: ClickDispatcher,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            links,
            cache,
            clicks,
            settings,
        }
    }

    /// Resolves `code` and queues a click attributed to `requester`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no live link uses `code`.
    /// Returns [`AppError::Gone`] if the link is past its expiry.
    /// Returns [`AppError::Internal`] if the store fails or times out.
    pub async fn resolve(
        &self,
        code: &str,
        requester: &RequestMeta,
    ) -> Result<Resolution, AppError> {
        let (entry, source) = match self.lookup_cache(code).await {
            Some(entry) => (entry, ResolutionSource::Cache),
            None => {
                let entry = self.load_from_store(code).await?;
                self.repopulate(code, &entry).await;
                (entry, ResolutionSource::Store)
            }
        };

        if entry.is_expired_at(Utc::now()) {
            debug!(code, expires_at = %entry.expires_at, "Short link expired");
            metrics::counter!("links_expired_total").increment(1);
            return Err(AppError::gone(
                "Short link has expired",
                json!({ "code": code, "expired_at": entry.expires_at }),
            ));
        }

        self.clicks.dispatch(ClickEvent::new(entry.id, code, requester));

        Ok(Resolution {
            long_url: entry.long_url,
            link_id: entry.id,
            source,
        })
    }

    async fn lookup_cache(&self, code: &str) -> Option<CachedLink> {
        let key = cache_key(code);

        match timeout(self.settings.cache_timeout, self.cache.get(&key)).await {
            Ok(Ok(Some(bytes))) => match CachedLink::from_bytes(&bytes) {
                Ok(entry) => {
                    debug!(key, "Cache HIT");
                    metrics::counter!("cache_hits_total").increment(1);
                    Some(entry)
                }
                Err(e) => {
                    warn!(key, error = %e, "Discarding undecodable cache entry");
                    metrics::counter!("cache_errors_total", "kind" => "decode").increment(1);
                    metrics::counter!("cache_misses_total").increment(1);
                    None
                }
            },
            Ok(Ok(None)) => {
                debug!(key, "Cache MISS");
                metrics::counter!("cache_misses_total").increment(1);
                None
            }
            Ok(Err(e)) => {
                warn!(key, error = %e, "Cache lookup failed, falling back to store");
                metrics::counter!("cache_errors_total", "kind" => "backend").increment(1);
                None
            }
            Err(_) => {
                warn!(key, "Cache lookup timed out, falling back to store");
                metrics::counter!("cache_errors_total", "kind" => "timeout").increment(1);
                None
            }
        }
    }

    async fn load_from_store(&self, code: &str) -> Result<CachedLink, AppError> {
        let lookup = async {
            let mut tx = self.links.begin().await?;

            match tx.find_by_code(code).await {
                Ok(Some(record)) => {
                    tx.commit().await?;
                    Ok(CachedLink::from(&record))
                }
                Ok(None) => {
                    tx.rollback().await?;
                    Err(AppError::not_found(
                        "Short link not found",
                        json!({ "code": code }),
                    ))
                }
                Err(e) => {
                    if let Err(rollback_err) = tx.rollback().await {
                        warn!(error = %rollback_err, "Rollback failed");
                    }
                    Err(e)
                }
            }
        };

        with_store_timeout(self.settings.store_timeout, "resolve", lookup).await
    }

    async fn repopulate(&self, code: &str, entry: &CachedLink) {
        let key = cache_key(code);

        let bytes = match entry.to_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key, error = %e, "Failed to encode cache entry");
                return;
            }
        };

        match timeout(
            self.settings.cache_timeout,
            self.cache.set(&key, &bytes, self.settings.cache_ttl),
        )
        .await
        {
            Ok(Ok(())) => debug!(key, ttl_secs = self.settings.cache_ttl.as_secs(), "Cache SET"),
            Ok(Err(e)) => {
                warn!(key, error = %e, "Failed to populate cache");
                metrics::counter!("cache_errors_total", "kind" => "backend").increment(1);
            }
            Err(_) => {
                warn!(key, "Cache write timed out");
                metrics::counter!("cache_errors_total", "kind" => "timeout").increment(1);
            }
        }
    }
}
