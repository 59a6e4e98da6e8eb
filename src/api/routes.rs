//! API route configuration.
//!
//! Mounted under `/api` and throttled per client IP by
//! [`crate::api::middleware::rate_limit`].

use crate::api::handlers::{
    create_link_handler, link_clicks_handler, link_status_handler, metrics_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// # Endpoints
///
/// - `POST /link`                 - Register a short link
/// - `GET  /link/{hash}`          - Verification state and quota usage
/// - `GET  /link/{hash}/clicks`   - Recorded clicks, newest first
/// - `GET  /stats/metrics/{hash}` - Uptime and click counters
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/link", post(create_link_handler))
        .route("/link/{hash}", get(link_status_handler))
        .route("/link/{hash}/clicks", get(link_clicks_handler))
        .route("/stats/metrics/{hash}", get(metrics_handler))
}
