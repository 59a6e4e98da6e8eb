//! DTOs for the per-link metrics endpoint.

use serde::Serialize;

use crate::application::services::SystemInfo;

/// Process uptime and memory plus global and per-link click counters.
#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub uptime_seconds: u64,
    pub memory_used_bytes: u64,
    pub total_clicks: i64,
    pub link_clicks: i64,
}

impl From<SystemInfo> for MetricsResponse {
    fn from(info: SystemInfo) -> Self {
        Self {
            uptime_seconds: info.uptime_seconds,
            memory_used_bytes: info.memory_used_bytes,
            total_clicks: info.total_clicks,
            link_clicks: info.link_clicks,
        }
    }
}
