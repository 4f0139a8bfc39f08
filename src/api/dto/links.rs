//! DTOs for link listing and click counts.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::api::dto::shorten::short_url;
use crate::application::services::LinkPage;
use crate::domain::repositories::LinkStats;

/// A live link with its click total.
#[derive(Debug, Serialize)]
pub struct LinkSummary {
    pub id: Uuid,
    pub short_code: String,
    pub short_url: String,
    pub long_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub clicks: i64,
}

impl LinkSummary {
    fn from_stats(stats: LinkStats, base_url: &str) -> Self {
        Self {
            short_url: short_url(base_url, &stats.short_code),
            id: stats.link_id,
            short_code: stats.short_code,
            long_url: stats.long_url,
            created_at: stats.created_at,
            expires_at: stats.expires_at,
            clicks: stats.clicks,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PageInfo {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// Paginated listing of the caller's links.
#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub items: Vec<LinkSummary>,
    pub pagination: PageInfo,
}

impl LinkListResponse {
    pub fn from_page(page: LinkPage, base_url: &str) -> Self {
        let total_pages = if page.page_size > 0 {
            (page.total + page.page_size - 1) / page.page_size
        } else {
            0
        };

        Self {
            items: page
                .items
                .into_iter()
                .map(|s| LinkSummary::from_stats(s, base_url))
                .collect(),
            pagination: PageInfo {
                page: page.page,
                page_size: page.page_size,
                total: page.total,
                total_pages,
            },
        }
    }
}

/// Click total for one link.
#[derive(Debug, Serialize)]
pub struct ClicksResponse {
    pub link_id: Uuid,
    pub total: i64,
}
