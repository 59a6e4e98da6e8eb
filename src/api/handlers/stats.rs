//! Handler for per-link metrics.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::stats::MetricsResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns process uptime and click counters for a link.
///
/// # Endpoint
///
/// `GET /api/stats/metrics/{hash}`
///
/// # Errors
///
/// Returns 404 Not Found if the hash doesn't exist.
pub async fn metrics_handler(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Json<MetricsResponse>, AppError> {
    let info = state.stats_service.system_info(&hash).await?;
    Ok(Json(info.into()))
}
