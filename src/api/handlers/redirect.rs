//! Handler for short URL redirect.

use axum::{
    extract::{ConnectInfo, Path, Request, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect},
};
use std::net::SocketAddr;
use tracing::debug;

use crate::domain::click_event::RequestMeta;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Resolve the code through the cache-aside [`crate::application::services::Resolver`]
/// 2. Queue a click event (dropped if the queue is full)
/// 3. Return 307 Temporary Redirect
///
/// # Errors
///
/// Returns 404 Not Found if no live link uses the code.
/// Returns 410 Gone if the link has expired.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    request: Request,
) -> Result<impl IntoResponse, AppError> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let requester = request_meta(request.headers(), peer, state.behind_proxy);

    let resolution = state.resolver.resolve(&code, &requester).await?;

    debug!(code, source = ?resolution.source, "Redirecting");

    Ok(Redirect::temporary(&resolution.long_url))
}

fn request_meta(headers: &HeaderMap, peer: Option<SocketAddr>, behind_proxy: bool) -> RequestMeta {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };

    RequestMeta {
        ip: client_ip(headers, peer, behind_proxy),
        user_agent: header_value(header::USER_AGENT),
        referer: header_value(header::REFERER),
    }
}
