//! Responses for the non-redirect gate outcomes.
//!
//! These are business states, not [`crate::error::AppError`]s, but they
//! share its JSON body so clients parse one shape.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::time::Duration;

use crate::error::ErrorBody;

/// `Retry-After` sent while verification is still running.
pub const IN_PROGRESS_RETRY_SECS: u64 = 10;

pub fn in_progress(hash: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        [(header::RETRY_AFTER, IN_PROGRESS_RETRY_SECS.to_string())],
        Json(ErrorBody::new(
            "computation_in_progress",
            "Verification in progress, retry later",
            json!({ "hash": hash }),
        )),
    )
        .into_response()
}

pub fn blocked(hash: &str) -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(ErrorBody::new(
            "blocked",
            "Target URL is unreachable",
            json!({ "hash": hash }),
        )),
    )
        .into_response()
}

pub fn rate_limited(hash: &str, retry_after: Option<Duration>) -> Response {
    let seconds = retry_after.map_or(1, retry_after_secs);

    (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::RETRY_AFTER, seconds.to_string())],
        Json(ErrorBody::new(
            "rate_limited",
            "Redirect limit reached",
            json!({ "hash": hash, "retry_after": seconds }),
        )),
    )
        .into_response()
}

pub fn not_found(hash: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody::new(
            "not_found",
            "Short link not found",
            json!({ "hash": hash }),
        )),
    )
        .into_response()
}

/// Whole seconds, rounded up, never below 1.
fn retry_after_secs(wait: Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}
