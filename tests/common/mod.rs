#![allow(dead_code)]

use async_trait::async_trait;
use axum::{Router, extract::ConnectInfo};
use axum_test::TestServer;
use chrono::{Duration, Utc};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tower::Layer;
use uuid::Uuid;

use snaplink::application::services::hash_token;
use snaplink::config::Config;
use snaplink::domain::click_event::{ClickDispatcher, ClickEvent};
use snaplink::domain::entities::{LinkRecord, NewClick};
use snaplink::domain::repositories::{ApiToken, ClickRepository, TokenRepository};
use snaplink::error::AppError;
use snaplink::infrastructure::cache::MemoryCache;
use snaplink::infrastructure::persistence::MemoryStore;
use snaplink::server::build_state;
use snaplink::state::AppState;

pub const SIGNING_SECRET: &str = "test-signing-secret";
pub const ALICE_TOKEN: &str = "alice-token-0123456789";
pub const BOB_TOKEN: &str = "bob-token-0123456789";
pub const REVOKED_TOKEN: &str = "revoked-token-0123456789";
pub const PEER_ADDR: &str = "127.0.0.1:12345";

/// Tokens held in memory, keyed by their HMAC hash like the real store.
pub struct StaticTokens {
    tokens: Mutex<Vec<ApiToken>>,
}

impl StaticTokens {
    pub fn new() -> Self {
        let token = |id: i64, name: &str, owner: &str, raw: &str, revoked: bool| ApiToken {
            id,
            name: name.to_string(),
            owner_id: owner.to_string(),
            token_hash: hash_token(SIGNING_SECRET, raw),
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: revoked.then(Utc::now),
        };

        Self {
            tokens: Mutex::new(vec![
                token(1, "alice", "alice", ALICE_TOKEN, false),
                token(2, "bob", "bob", BOB_TOKEN, false),
                token(3, "old", "alice", REVOKED_TOKEN, true),
            ]),
        }
    }
}

#[async_trait]
impl TokenRepository for StaticTokens {
    async fn find_active(&self, token_hash: &str) -> Result<Option<ApiToken>, AppError> {
        Ok(self
            .tokens
            .lock()
            .await
            .iter()
            .find(|t| t.token_hash == token_hash && t.revoked_at.is_none())
            .cloned())
    }

    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError> {
        if let Some(t) = self
            .tokens
            .lock()
            .await
            .iter_mut()
            .find(|t| t.token_hash == token_hash)
        {
            t.last_used_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn create_token(
        &self,
        name: &str,
        owner_id: &str,
        token_hash: &str,
    ) -> Result<ApiToken, AppError> {
        let mut tokens = self.tokens.lock().await;
        let token = ApiToken {
            id: tokens.len() as i64 + 1,
            name: name.to_string(),
            owner_id: owner_id.to_string(),
            token_hash: token_hash.to_string(),
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        };
        tokens.push(token.clone());
        Ok(token)
    }

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError> {
        Ok(self.tokens.lock().await.clone())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ApiToken>, AppError> {
        Ok(self.tokens.lock().await.iter().find(|t| t.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, AppError> {
        Ok(self
            .tokens
            .lock()
            .await
            .iter()
            .find(|t| t.name == name)
            .cloned())
    }

    async fn revoke_token(&self, id: i64) -> Result<(), AppError> {
        if let Some(t) = self.tokens.lock().await.iter_mut().find(|t| t.id == id) {
            t.revoked_at = Some(Utc::now());
        }
        Ok(())
    }
}

/// Inserts a fixed peer address, as `into_make_service_with_connect_info` would.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = PEER_ADDR.parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/unused".to_string(),
        redis_url: None,
        listen_addr: "127.0.0.1:0".to_string(),
        base_url: "https://sl.example".to_string(),
        log_level: "info".to_string(),
        log_format: "text".to_string(),
        click_queue_capacity: 100,
        click_worker_concurrency: 2,
        behind_proxy: false,
        cache_ttl_seconds: 1800,
        link_ttl_days: 30,
        code_retry_budget: 10,
        store_timeout_ms: 2000,
        cache_timeout_ms: 250,
        token_signing_secret: SIGNING_SECRET.to_string(),
        db_max_connections: 5,
        db_connect_timeout: 5,
        db_idle_timeout: 60,
        db_max_lifetime: 300,
    }
}

/// A full application over in-memory backends.
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub store: MemoryStore,
    pub cache: Arc<MemoryCache>,
    pub click_rx: mpsc::Receiver<ClickEvent>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config(), false)
    }

    pub fn with_rate_limit() -> Self {
        Self::with_config(test_config(), true)
    }

    pub fn with_config(config: Config, rate_limited: bool) -> Self {
        let store = MemoryStore::new();
        let cache = Arc::new(MemoryCache::new());
        let (dispatcher, click_rx) = ClickDispatcher::channel(config.click_queue_capacity);

        let state = build_state(
            &config,
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(StaticTokens::new()),
            cache.clone(),
            dispatcher,
        );

        let app: Router = snaplink::routes::router(state.clone(), rate_limited)
            .layer(MockConnectInfoLayer);
        let server = TestServer::new(app).unwrap();

        Self {
            server,
            state,
            store,
            cache,
            click_rx,
        }
    }

    /// Stores a live link directly and returns it.
    pub async fn seed_link(&self, owner: &str, code: &str, long_url: &str) -> LinkRecord {
        let link = LinkRecord {
            id: Uuid::new_v4(),
            owner_id: owner.to_string(),
            long_url: long_url.to_string(),
            short_code: code.to_string(),
            created_at: Utc::now(),
            expires_at: Utc::now() + Duration::days(30),
            deleted_at: None,
        };
        self.store.seed(link.clone()).await;
        link
    }

    pub async fn seed_expired_link(&self, owner: &str, code: &str, long_url: &str) -> LinkRecord {
        let link = LinkRecord {
            id: Uuid::new_v4(),
            owner_id: owner.to_string(),
            long_url: long_url.to_string(),
            short_code: code.to_string(),
            created_at: Utc::now() - Duration::days(31),
            expires_at: Utc::now() - Duration::hours(1),
            deleted_at: None,
        };
        self.store.seed(link.clone()).await;
        link
    }

    pub async fn seed_clicks(&self, link_id: Uuid, count: usize) {
        for _ in 0..count {
            self.store
                .record_click(NewClick {
                    link_id,
                    clicked_at: Utc::now(),
                    ip: Some("10.0.0.1".to_string()),
                    user_agent: None,
                    referer: None,
                })
                .await
                .unwrap();
        }
    }

    /// Number of click events waiting in the queue.
    pub fn queued_clicks(&mut self) -> Vec<ClickEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.click_rx.try_recv() {
            events.push(event);
        }
        events
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
