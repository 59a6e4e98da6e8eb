//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{hash}`     - Short link redirect
//! - `GET  /{hash}/qr`  - QR image of the short URL
//! - `GET  /health`     - Health check: registry, verification queues, click queue
//! - `/api/*`           - JSON API (per-IP rate limited)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket on `/api`
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, qr_handler, redirect_handler};
use crate::api::middleware::rate_limit::{self, RateLimit};
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `api_limit` - limiter settings for `/api`; with `behind_proxy` set the
///   client IP is read from `X-Forwarded-For` / `X-Real-IP` headers instead
///   of the peer socket address
///
/// # Errors
///
/// Returns an error if the rate limit settings are invalid.
pub fn app_router(state: AppState, api_limit: RateLimit) -> anyhow::Result<NormalizePath<Router>> {
    let api_router = api::routes::api_routes().layer(rate_limit::layer(api_limit)?);

    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/{hash}", get(redirect_handler))
        .route("/{hash}/qr", get(qr_handler))
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer());

    Ok(NormalizePathLayer::trim_trailing_slash().layer(router))
}
