//! API route configuration.
//!
//! All API endpoints require Bearer token authentication via
//! [`crate::api::middleware::auth`].

use crate::api::handlers::{
    delete_link_handler, link_clicks_handler, list_links_handler, shorten_handler,
};
use crate::api::middleware::auth;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

/// All API routes, protected by Bearer token authentication.
///
/// # Endpoints
///
/// - `POST   /shorten`            - Create a short link
/// - `GET    /links`              - List the caller's links (paginated)
/// - `DELETE /links/{id}`         - Soft-delete a link
/// - `GET    /links/{id}/clicks`  - Click total for a link
pub fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/links", get(list_links_handler))
        .route("/links/{id}", delete(delete_link_handler))
        .route("/links/{id}/clicks", get(link_clicks_handler))
        .route_layer(middleware::from_fn_with_state(state, auth::layer))
}
