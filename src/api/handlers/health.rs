//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::domain::TaskKind;
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Registry**: backing store answers
/// 2. **Verification queues**: both task kinds have a live consumer
/// 3. **Click queue**: channel is open
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let checks = HealthChecks {
        registry: check_registry(&state).await,
        reachability_queue: check_task_queue(&state, TaskKind::Reachability),
        qr_queue: check_task_queue(&state, TaskKind::Qr),
        click_queue: check_click_queue(&state),
    };

    let all_healthy = checks.all_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks,
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_registry(state: &AppState) -> CheckStatus {
    if state.registry.health_check().await {
        CheckStatus::ok("Registry reachable")
    } else {
        CheckStatus::error("Registry unavailable")
    }
}

fn check_task_queue(state: &AppState, kind: TaskKind) -> CheckStatus {
    if state.dispatcher.is_open(kind) {
        CheckStatus::ok(format!("Depth: {}", state.dispatcher.queue_depth(kind)))
    } else {
        CheckStatus::error(format!("No consumer for {} tasks", kind.as_str()))
    }
}

fn check_click_queue(state: &AppState) -> CheckStatus {
    if state.click_sender.is_closed() {
        CheckStatus::error("Click queue is closed")
    } else {
        CheckStatus::ok(format!("Capacity: {}", state.click_sender.capacity()))
    }
}
