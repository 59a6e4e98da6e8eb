//! Handler for short URL redirect.

use axum::{
    extract::{Path, Request, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
};
use tower_governor::key_extractor::KeyExtractor;
use tracing::debug;

use crate::api::handlers::responses;
use crate::domain::RedirectOutcome;
use crate::domain::click_event::ClickEvent;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short hash to its target URL.
///
/// # Endpoint
///
/// `GET /{hash}`
///
/// # Response Codes
///
/// - **307 Temporary Redirect**: target verified and quota available
/// - **400 Bad Request** + `Retry-After: 10`: reachability not decided yet
/// - **403 Forbidden**: target failed verification
/// - **404 Not Found**: unknown hash
/// - **429 Too Many Requests** + `Retry-After`: quota for the window used up
///
/// # Click Tracking
///
/// Admitted redirects send a click event to a bounded channel for async
/// processing. If the queue is full, the click is dropped (fire-and-forget).
/// The client IP is resolved the same way as for the API limiter.
pub async fn redirect_handler(
    Path(hash): Path<String>,
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, AppError> {
    let outcome = state.redirect_gate.resolve(&hash).await?;

    let response = match outcome {
        RedirectOutcome::Redirect(target) => {
            let headers = request.headers();
            let ip = state.client_ip.extract(&request).ok();
            let click_event = ClickEvent::new(
                hash,
                ip.map(|ip| ip.to_string()),
                headers
                    .get(header::USER_AGENT)
                    .and_then(|v| v.to_str().ok()),
                headers.get(header::REFERER).and_then(|v| v.to_str().ok()),
            );

            if state.click_sender.try_send(click_event).is_err() {
                debug!("Click queue full or closed, click dropped");
            }

            Redirect::temporary(&target).into_response()
        }
        RedirectOutcome::NotFound => responses::not_found(&hash),
        RedirectOutcome::ComputationInProgress => responses::in_progress(&hash),
        RedirectOutcome::Blocked => responses::blocked(&hash),
        RedirectOutcome::RateLimited => {
            responses::rate_limited(&hash, state.redirect_gate.retry_after(&hash))
        }
    };

    Ok(response)
}
