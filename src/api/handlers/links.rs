//! Handlers for managing the caller's links.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::api::dto::links::{ClicksResponse, LinkListResponse};
use crate::api::dto::pagination::PaginationParams;
use crate::application::services::Principal;
use crate::error::AppError;
use crate::state::AppState;

/// Lists the caller's live links with click totals, newest first.
///
/// # Endpoint
///
/// `GET /api/links?page=1&page_size=25`
///
/// # Errors
///
/// Returns 400 Bad Request for out-of-range pagination.
pub async fn list_links_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<LinkListResponse>, AppError> {
    let (page, page_size) = params.resolve()?;

    let links = state
        .stats_service
        .owner_links(&principal.owner_id, page, page_size)
        .await?;

    Ok(Json(LinkListResponse::from_page(links, &state.base_url)))
}

/// Returns the total number of recorded clicks for one of the caller's links.
///
/// # Endpoint
///
/// `GET /api/links/{id}/clicks`
///
/// # Errors
///
/// Returns 404 Not Found if the link does not exist or belongs to someone else.
pub async fn link_clicks_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClicksResponse>, AppError> {
    let total = state
        .stats_service
        .link_clicks(id, &principal.owner_id)
        .await?;

    Ok(Json(ClicksResponse { link_id: id, total }))
}

/// Soft-deletes one of the caller's links.
///
/// # Endpoint
///
/// `DELETE /api/links/{id}`
///
/// The short code becomes available again immediately. Cached redirects keep
/// working until their cache entry expires.
///
/// # Errors
///
/// Returns 404 Not Found if the link does not exist, is already deleted, or
/// belongs to someone else.
pub async fn delete_link_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .link_service
        .delete_link(id, &principal.owner_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
