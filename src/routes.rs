//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`      - Short link redirect (public)
//! - `GET  /health`      - Health check: DB, cache, click queue (public)
//! - `/api/*`            - REST API (Bearer token required)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket (configurable for proxy deployments)
//! - **Authentication** - Bearer token on `/api`
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{rate_limit, tracing};
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// Rate limiting keys on the socket peer unless `state.behind_proxy` is set,
/// in which case it reads `X-Forwarded-For` / `X-Real-IP`. The peer variant
/// needs the server to provide `ConnectInfo<SocketAddr>`.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state, true))
}

/// Builds the routes, optionally without rate limiting.
///
/// Unlimited routers are for in-process use where no peer address exists.
pub fn router(state: AppState, rate_limited: bool) -> Router {
    let behind_proxy = state.behind_proxy;

    let mut redirect = Router::new().route("/{code}", get(redirect_handler));
    let mut api_router = api::routes::protected_routes(state.clone());

    if rate_limited {
        redirect = rate_limit::apply(redirect, rate_limit::PUBLIC, behind_proxy);
        api_router = rate_limit::apply(api_router, rate_limit::SECURE, behind_proxy);
    }

    Router::new()
        .merge(redirect)
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer())
}
