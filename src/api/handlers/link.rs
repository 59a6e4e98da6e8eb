//! Handlers for link creation and inspection.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use validator::Validate;

use crate::api::dto::clicks::{ClickInfo, ClicksQuery, ClicksResponse};
use crate::api::dto::link::{CreateLinkRequest, CreateLinkResponse, LinkStatusResponse};
use crate::application::services::stats_service::DEFAULT_CLICK_PAGE;
use crate::error::AppError;
use crate::state::AppState;

/// Registers a short link and queues its verification.
///
/// # Endpoint
///
/// `POST /api/link`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/page",
///   "limit": 3,              // optional, 0 = unlimited
///   "qr": true,              // optional
///   "custom_hash": "my-link" // optional
/// }
/// ```
///
/// # Response
///
/// `201 Created` with `Location` set to the short URL:
///
/// ```json
/// {
///   "hash": "my-link",
///   "url": "http://localhost:3000/my-link",
///   "qr": "http://localhost:3000/my-link/qr",
///   "properties": { "redirect_limit": 3, "reachability": "pending" }
/// }
/// ```
///
/// # Errors
///
/// - 400 Bad Request if validation fails
/// - 409 Conflict if the custom hash is taken
pub async fn create_link_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let created = state
        .link_service
        .create_link(
            &payload.url,
            payload.limit.unwrap_or(0),
            payload.qr.unwrap_or(false),
            payload.custom_hash,
        )
        .await?;

    let location = created.short_url.clone();

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(CreateLinkResponse::from(created)),
    ))
}

/// Returns verification state and quota usage of a link.
///
/// # Endpoint
///
/// `GET /api/link/{hash}`
pub async fn link_status_handler(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Json<LinkStatusResponse>, AppError> {
    let view = state.link_service.query_status(&hash).await?;
    Ok(Json(view.into()))
}

/// Lists the most recent clicks of a link, newest first.
///
/// # Endpoint
///
/// `GET /api/link/{hash}/clicks?limit=50`
pub async fn link_clicks_handler(
    State(state): State<AppState>,
    Path(hash): Path<String>,
    Query(params): Query<ClicksQuery>,
) -> Result<Json<ClicksResponse>, AppError> {
    let clicks = state
        .stats_service
        .clicks_for(&hash, params.limit.unwrap_or(DEFAULT_CLICK_PAGE))
        .await?;

    Ok(Json(ClicksResponse {
        hash,
        items: clicks.into_iter().map(ClickInfo::from).collect(),
    }))
}
