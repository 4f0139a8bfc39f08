//! Repository trait for click recording and aggregation.

use crate::domain::entities::{Click, NewClick};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A live link together with its total click count.
#[derive(Debug, Clone)]
pub struct LinkStats {
    pub link_id: Uuid,
    pub short_code: String,
    pub long_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub clicks: i64,
}

/// Pagination window for owner-scoped listings.
#[derive(Debug, Clone, Copy)]
pub struct StatsFilter {
    pub offset: i64,
    pub limit: i64,
}

impl StatsFilter {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self { offset, limit }
    }
}

/// Repository interface for click events.
///
/// Writes are append-only and happen off the request path (see
/// [`crate::domain::click_worker`]); reads serve reporting endpoints.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgClickRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryStore`] - In-process implementation for tests
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Appends a click event inside its own transaction.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `link_id` is empty or does not
    /// reference a link.
    /// Returns [`AppError::Internal`] on database errors.
    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError>;

    /// Counts all clicks recorded for a link.
    async fn count_clicks(&self, link_id: Uuid) -> Result<i64, AppError>;

    /// Counts clicks for a link only if it is live and owned by `owner_id`.
    ///
    /// Returns `Ok(None)` when the link is missing, deleted or owned by someone else.
    async fn count_clicks_for_owner(
        &self,
        link_id: Uuid,
        owner_id: &str,
    ) -> Result<Option<i64>, AppError>;

    /// Lists an owner's live links, newest first, with click totals.
    async fn owner_link_stats(
        &self,
        owner_id: &str,
        filter: StatsFilter,
    ) -> Result<Vec<LinkStats>, AppError>;

    /// Counts an owner's live links.
    async fn count_owner_links(&self, owner_id: &str) -> Result<i64, AppError>;
}
