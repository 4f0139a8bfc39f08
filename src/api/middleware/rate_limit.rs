//! Rate limiting middleware using token bucket algorithm.
//!
//! Limits are keyed by client IP. Directly exposed deployments key on the
//! socket peer; deployments behind a trusted reverse proxy key on
//! `X-Forwarded-For` / `X-Real-IP` instead.

use axum::Router;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

/// Token bucket parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Seconds per replenished request.
    pub per_second: u64,
    pub burst_size: u32,
}

/// Limits for public endpoints such as redirects.
///
/// - **Rate**: 1 request per 2 seconds replenished
/// - **Burst**: 100 requests
pub const PUBLIC: Limits = Limits {
    per_second: 2,
    burst_size: 100,
};

/// Stricter limits for authenticated API endpoints.
///
/// - **Rate**: 1 request per second replenished
/// - **Burst**: 10 requests
pub const SECURE: Limits = Limits {
    per_second: 1,
    burst_size: 10,
};

/// Wraps `router` in a per-IP rate limiter.
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
///
/// # Example
///
/// ```rust,ignore
/// let api = rate_limit::apply(protected_routes(), rate_limit::SECURE, config.behind_proxy);
/// ```
pub fn apply<S>(router: Router<S>, limits: Limits, behind_proxy: bool) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    if behind_proxy {
        router.layer(layer(SmartIpKeyExtractor, limits))
    } else {
        router.layer(layer(PeerIpKeyExtractor, limits))
    }
}

/// Creates a governor layer keyed by `extractor`.
pub fn layer<K>(
    extractor: K,
    limits: Limits,
) -> GovernorLayer<K, NoOpMiddleware<QuantaInstant>, axum::body::Body>
where
    K: KeyExtractor,
{
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(extractor)
            .per_second(limits.per_second.max(1))
            .burst_size(limits.burst_size.max(1))
            .finish()
            .expect("non-zero period and burst always build a config"),
    );

    GovernorLayer::new(governor_conf)
}
