//! Handler for QR code images.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::api::handlers::responses;
use crate::application::services::QrLookup;
use crate::error::AppError;
use crate::state::AppState;

/// Serves the rendered QR code of a short link.
///
/// # Endpoint
///
/// `GET /{hash}/qr`
///
/// # Response Codes
///
/// - **200 OK**: image body (`image/svg+xml`)
/// - **400 Bad Request** + `Retry-After: 10`: still rendering
/// - **403 Forbidden**: target failed verification
/// - **404 Not Found**: unknown hash, or no QR code was requested
pub async fn qr_handler(
    Path(hash): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let response = match state.link_service.qr_image(&hash).await? {
        QrLookup::Ready(bytes) => (
            [
                (header::CONTENT_TYPE, state.qr_content_type),
                (header::CACHE_CONTROL, "public, max-age=86400"),
            ],
            bytes,
        )
            .into_response(),
        QrLookup::InProgress => responses::in_progress(&hash),
        QrLookup::Blocked => responses::blocked(&hash),
        QrLookup::NotFound | QrLookup::NotRequested => responses::not_found(&hash),
    };

    Ok(response)
}
