//! Handler for link shortening endpoint.

use axum::{Extension, Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::shorten::{LinkResponse, ShortenRequest};
use crate::application::services::{CreateLink, Principal};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link owned by the authenticated caller.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/some/long/path",
///   "custom_code": "promo24",
///   "expires_at": "2030-01-01T00:00:00Z"
/// }
/// ```
///
/// `custom_code` and `expires_at` are optional.
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "id": "6f1c...",
///   "short_code": "promo24",
///   "short_url": "https://sl.example/promo24",
///   "long_url": "https://example.com/some/long/path",
///   "created_at": "2029-12-01T10:00:00Z",
///   "expires_at": "2030-01-01T00:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request for an invalid URL, custom code or expiry.
/// Returns 409 Conflict if the custom code is already taken.
pub async fn shorten_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .create_link(CreateLink {
            owner_id: principal.owner_id,
            long_url: payload.url,
            custom_code: payload.custom_code,
            expires_at: payload.expires_at,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(LinkResponse::from_record(link, &state.base_url)),
    ))
}
