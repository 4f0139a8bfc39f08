//! Shared application state for all HTTP handlers.

use std::sync::Arc;

use crate::application::services::{AuthService, LinkService, Resolver, StatsService};
use crate::domain::click_event::ClickDispatcher;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::cache::CacheService;

/// Application state cloned into every request.
///
/// Services sit behind `Arc`; the dispatcher is a cheap sender clone. The
/// click worker stops once every clone of this state has been dropped.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver>,
    pub link_service: Arc<LinkService>,
    pub stats_service: Arc<StatsService>,
    pub auth_service: Arc<AuthService>,
    /// Used directly only by the health check.
    pub links: Arc<dyn LinkRepository>,
    pub cache: Arc<dyn CacheService>,
    pub clicks: ClickDispatcher,
    /// Public base URL, without trailing slash.
    pub base_url: String,
    pub behind_proxy: bool,
}
