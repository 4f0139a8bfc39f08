//! Click statistics service.

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::domain::repositories::{ClickRepository, LinkStats, StatsFilter};
use crate::error::AppError;

/// One page of an owner's links.
#[derive(Debug, Clone)]
pub struct LinkPage {
    pub items: Vec<LinkStats>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

/// Service for click count queries.
///
/// Counts are eventually consistent: clicks are written by the background
/// worker after the redirect has been served.
pub struct StatsService {
    repository: Arc<dyn ClickRepository>,
}

impl StatsService {
    pub fn new(repository: Arc<dyn ClickRepository>) -> Self {
        Self { repository }
    }

    /// Total clicks recorded for a link, regardless of owner.
    pub async fn total_clicks(&self, link_id: Uuid) -> Result<i64, AppError> {
        self.repository.count_clicks(link_id).await
    }

    /// Total clicks for a live link owned by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link is missing, deleted or owned
    /// by someone else.
    pub async fn link_clicks(&self, link_id: Uuid, owner_id: &str) -> Result<i64, AppError> {
        self.repository
            .count_clicks_for_owner(link_id, owner_id)
            .await?
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": link_id })))
    }

    /// Lists an owner's live links with click totals, newest first.
    ///
    /// `page` is 1-based. Callers are expected to have validated both bounds.
    pub async fn owner_links(
        &self,
        owner_id: &str,
        page: i64,
        page_size: i64,
    ) -> Result<LinkPage, AppError> {
        let filter = StatsFilter::new((page - 1) * page_size, page_size);

        let items = self.repository.owner_link_stats(owner_id, filter).await?;
        let total = self.repository.count_owner_links(owner_id).await?;

        Ok(LinkPage {
            items,
            total,
            page,
            page_size,
        })
    }
}
