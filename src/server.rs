//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache setup, worker spawning, and the Axum
//! server lifecycle including graceful shutdown.

use crate::application::services::{
    AuthService, LinkService, Resolver, ResolverSettings, StatsService,
};
use crate::config::Config;
use crate::domain::click_event::ClickDispatcher;
use crate::domain::click_worker::spawn_click_worker;
use crate::domain::repositories::{ClickRepository, LinkRepository, TokenRepository};
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::persistence::{PgClickRepository, PgLinkRepository, PgTokenRepository};
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::code_generator::CodeGenerator;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Upper bound on waiting for queued clicks to be written at shutdown.
const CLICK_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Redis cache (or NullCache fallback)
/// - Background click worker
/// - Axum HTTP server
///
/// On SIGINT/SIGTERM the server stops accepting connections, finishes
/// in-flight requests, then waits up to 10 seconds for the click queue to drain.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection fails
/// - Migrations fail
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to migrate")?;

    let cache = connect_cache(&config).await;

    let pool = Arc::new(pool);
    let links: Arc<dyn LinkRepository> = Arc::new(PgLinkRepository::new(pool.clone()));
    let clicks: Arc<dyn ClickRepository> = Arc::new(PgClickRepository::new(pool.clone()));
    let tokens: Arc<dyn TokenRepository> = Arc::new(PgTokenRepository::new(pool.clone()));

    let (dispatcher, click_rx) = ClickDispatcher::channel(config.click_queue_capacity);
    let worker = spawn_click_worker(click_rx, clicks.clone(), config.click_worker_concurrency);

    let state = build_state(&config, links, clicks, tokens, cache, dispatcher);

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address: {}", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router and every dispatcher clone are gone; the worker drains and exits.
    info!("HTTP server stopped, draining click queue");
    match tokio::time::timeout(CLICK_DRAIN_TIMEOUT, worker).await {
        Ok(Ok(())) => info!("Click queue drained"),
        Ok(Err(e)) => warn!(error = %e, "Click worker terminated abnormally"),
        Err(_) => warn!(
            timeout_secs = CLICK_DRAIN_TIMEOUT.as_secs(),
            "Click queue drain timed out, remaining clicks are lost"
        ),
    }

    Ok(())
}

/// Connects to Redis if configured, otherwise falls back to [`NullCache`].
async fn connect_cache(config: &Config) -> Arc<dyn CacheService> {
    let Some(redis_url) = &config.redis_url else {
        info!("Cache disabled (NullCache)");
        return Arc::new(NullCache::new());
    };

    match RedisCache::connect(redis_url).await {
        Ok(redis) => {
            info!("Cache enabled (Redis)");
            Arc::new(redis)
        }
        Err(e) => {
            warn!("Failed to connect to Redis: {}. Using NullCache.", e);
            Arc::new(NullCache::new())
        }
    }
}

/// Wires services over the given backends.
pub fn build_state(
    config: &Config,
    links: Arc<dyn LinkRepository>,
    clicks: Arc<dyn ClickRepository>,
    tokens: Arc<dyn TokenRepository>,
    cache: Arc<dyn CacheService>,
    dispatcher: ClickDispatcher,
) -> AppState {
    let resolver = Resolver::new(
        links.clone(),
        cache.clone(),
        dispatcher.clone(),
        ResolverSettings {
            cache_ttl: config.cache_ttl(),
            cache_timeout: config.cache_timeout(),
            store_timeout: config.store_timeout(),
        },
    );

    let link_service = LinkService::new(
        links.clone(),
        CodeGenerator::new(config.code_retry_budget),
        config.link_ttl(),
        config.store_timeout(),
    );

    AppState {
        resolver: Arc::new(resolver),
        link_service: Arc::new(link_service),
        stats_service: Arc::new(StatsService::new(clicks)),
        auth_service: Arc::new(AuthService::new(
            tokens,
            config.token_signing_secret.clone(),
        )),
        links,
        cache,
        clicks: dispatcher,
        base_url: config.base_url.clone(),
        behind_proxy: config.behind_proxy,
    }
}

/// Completes on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
