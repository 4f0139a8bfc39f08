//! Business logic services for the application layer.

use std::future::Future;
use std::time::Duration;

use serde_json::json;
use tracing::error;

use crate::error::AppError;

pub mod auth_service;
pub mod link_service;
pub mod resolver;
pub mod stats_service;

pub use auth_service::{AuthService, Principal, hash_token};
pub use link_service::{CreateLink, LinkService};
pub use resolver::{Resolution, ResolutionSource, Resolver, ResolverSettings, cache_key};
pub use stats_service::{LinkPage, StatsService};

/// Runs a store operation under `limit`.
///
/// An elapsed timeout drops the operation (rolling back any transaction it
/// holds) and surfaces as [`AppError::Internal`]. Timeouts are not retried.
pub(crate) async fn with_store_timeout<T, F>(
    limit: Duration,
    operation: &'static str,
    fut: F,
) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            error!(
                operation,
                timeout_ms = limit.as_millis() as u64,
                "Store operation timed out"
            );
            metrics::counter!("store_timeouts_total", "operation" => operation).increment(1);
            Err(AppError::internal(
                "Store operation timed out",
                json!({ "operation": operation }),
            ))
        }
    }
}
