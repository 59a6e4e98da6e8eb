//! Per-client rate limiting for the JSON API.
//!
//! This is request throttling by client IP, independent of the per-link
//! redirect quota enforced by the redirect gate.

use anyhow::{Context, Result};
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::net::IpAddr;
use std::sync::Arc;
use tower_governor::{
    GovernorError, GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

/// Token bucket settings for one limiter.
#[derive(Debug, Clone, Copy)]
pub struct RateLimit {
    /// Seconds to replenish one request slot (governor's `per_second`).
    pub per_second: u64,
    pub burst: u32,
    /// Read the client IP from `X-Forwarded-For` / `X-Real-IP` / `Forwarded`.
    /// Enable only behind a trusted reverse proxy.
    pub behind_proxy: bool,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            per_second: 2,
            burst: 100,
            behind_proxy: false,
        }
    }
}

/// Client IP from the socket, or from proxy headers when configured.
///
/// The API limiter keys on it and click records store it, so both see the
/// same client.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientIpKeyExtractor {
    behind_proxy: bool,
}

impl ClientIpKeyExtractor {
    pub fn new(behind_proxy: bool) -> Self {
        Self { behind_proxy }
    }
}

impl KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        if self.behind_proxy {
            SmartIpKeyExtractor.extract(req)
        } else {
            PeerIpKeyExtractor.extract(req)
        }
    }
}

pub type ApiGovernorLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Creates the limiter for `/api` routes.
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
///
/// # Errors
///
/// Returns an error if `per_second` or `burst` is zero.
///
/// # Example
///
/// ```rust,ignore
/// let api = Router::new()
///     .route("/link", post(create_link_handler))
///     .layer(rate_limit::layer(RateLimit::default())?);
/// ```
pub fn layer(limit: RateLimit) -> Result<ApiGovernorLayer> {
    let governor_conf = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor {
            behind_proxy: limit.behind_proxy,
        })
        .per_second(limit.per_second)
        .burst_size(limit.burst)
        .finish()
        .context("Rate limit must have a non-zero period and burst")?;

    Ok(GovernorLayer::new(Arc::new(governor_conf)))
}
