//! In-process implementation of the link and click repositories.
//!
//! A transaction holds the store lock for its whole lifetime and mutates a
//! private working copy, which is published on commit. Transactions are
//! therefore serializable and a dropped transaction leaves no trace.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::domain::entities::{Click, LinkRecord, NewClick};
use crate::domain::repositories::{
    ClickRepository, LinkRepository, LinkStats, LinkTransaction, StatsFilter,
};
use crate::error::AppError;

#[derive(Default)]
struct StoreState {
    links: Vec<LinkRecord>,
    clicks: Vec<Click>,
}

impl StoreState {
    fn live_link(&self, id: Uuid) -> Option<&LinkRecord> {
        self.links.iter().find(|l| l.id == id && !l.is_deleted())
    }
}

/// Link and click storage kept in process memory.
///
/// Cloning yields another handle to the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
    latency_ms: Arc<AtomicU64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every `begin` by `latency`, to exercise caller timeouts.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Inserts a record directly, bypassing validation and uniqueness checks.
    pub async fn seed(&self, link: LinkRecord) {
        self.state.lock().await.links.push(link);
    }

    /// Every stored link, deleted ones included.
    pub async fn links(&self) -> Vec<LinkRecord> {
        self.state.lock().await.links.clone()
    }

    pub async fn clicks(&self) -> Vec<Click> {
        self.state.lock().await.clicks.clone()
    }

    async fn simulate_latency(&self) {
        let ms = self.latency_ms.load(Ordering::SeqCst);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

#[async_trait]
impl LinkRepository for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn LinkTransaction>, AppError> {
        self.simulate_latency().await;

        let guard = self.state.clone().lock_owned().await;
        let links = guard.links.clone();
        Ok(Box::new(MemoryTransaction {
            guard: Some(guard),
            links,
        }))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// Serializable transaction over a [`MemoryStore`].
pub struct MemoryTransaction {
    guard: Option<OwnedMutexGuard<StoreState>>,
    links: Vec<LinkRecord>,
}

impl MemoryTransaction {
    fn ensure_open(&self) -> Result<(), AppError> {
        if self.guard.is_none() {
            return Err(AppError::internal("Transaction already finished", json!({})));
        }
        Ok(())
    }
}

#[async_trait]
impl LinkTransaction for MemoryTransaction {
    async fn find_by_code(&mut self, code: &str) -> Result<Option<LinkRecord>, AppError> {
        self.ensure_open()?;
        Ok(self
            .links
            .iter()
            .find(|l| l.short_code == code && !l.is_deleted())
            .cloned())
    }

    async fn insert(&mut self, link: &LinkRecord) -> Result<(), AppError> {
        self.ensure_open()?;

        if self
            .links
            .iter()
            .any(|l| l.short_code == link.short_code && !l.is_deleted())
        {
            return Err(AppError::conflict(
                "Resource already exists",
                json!({ "short_code": link.short_code }),
            ));
        }
        if self.links.iter().any(|l| l.id == link.id) {
            return Err(AppError::conflict(
                "Resource already exists",
                json!({ "id": link.id }),
            ));
        }

        self.links.push(link.clone());
        Ok(())
    }

    async fn soft_delete(&mut self, id: Uuid, owner_id: &str) -> Result<bool, AppError> {
        self.ensure_open()?;

        match self
            .links
            .iter_mut()
            .find(|l| l.id == id && l.owner_id == owner_id && !l.is_deleted())
        {
            Some(link) => {
                link.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn commit(&mut self) -> Result<(), AppError> {
        let mut guard = self
            .guard
            .take()
            .ok_or_else(|| AppError::internal("Transaction already finished", json!({})))?;
        guard.links = std::mem::take(&mut self.links);
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), AppError> {
        self.guard.take();
        self.links.clear();
        Ok(())
    }
}

#[async_trait]
impl ClickRepository for MemoryStore {
    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError> {
        new_click.validate()?;

        let mut state = self.state.lock().await;
        if !state.links.iter().any(|l| l.id == new_click.link_id) {
            return Err(AppError::bad_request(
                "Referenced resource does not exist",
                json!({ "link_id": new_click.link_id }),
            ));
        }

        let click = Click {
            id: state.clicks.len() as i64 + 1,
            link_id: new_click.link_id,
            clicked_at: new_click.clicked_at,
            ip: new_click.ip,
            user_agent: new_click.user_agent,
            referer: new_click.referer,
        };
        state.clicks.push(click.clone());
        Ok(click)
    }

    async fn count_clicks(&self, link_id: Uuid) -> Result<i64, AppError> {
        let state = self.state.lock().await;
        Ok(state.clicks.iter().filter(|c| c.link_id == link_id).count() as i64)
    }

    async fn count_clicks_for_owner(
        &self,
        link_id: Uuid,
        owner_id: &str,
    ) -> Result<Option<i64>, AppError> {
        let state = self.state.lock().await;
        let owned = state
            .live_link(link_id)
            .is_some_and(|l| l.owner_id == owner_id);
        if !owned {
            return Ok(None);
        }

        Ok(Some(
            state.clicks.iter().filter(|c| c.link_id == link_id).count() as i64,
        ))
    }

    async fn owner_link_stats(
        &self,
        owner_id: &str,
        filter: StatsFilter,
    ) -> Result<Vec<LinkStats>, AppError> {
        let state = self.state.lock().await;

        let mut owned: Vec<&LinkRecord> = state
            .links
            .iter()
            .filter(|l| l.owner_id == owner_id && !l.is_deleted())
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        Ok(owned
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .map(|l| LinkStats {
                link_id: l.id,
                short_code: l.short_code.clone(),
                long_url: l.long_url.clone(),
                created_at: l.created_at,
                expires_at: l.expires_at,
                clicks: state.clicks.iter().filter(|c| c.link_id == l.id).count() as i64,
            })
            .collect())
    }

    async fn count_owner_links(&self, owner_id: &str) -> Result<i64, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .links
            .iter()
            .filter(|l| l.owner_id == owner_id && !l.is_deleted())
            .count() as i64)
    }
}
