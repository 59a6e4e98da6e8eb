//! DTOs for click event data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Click;

/// Query parameters for `GET /api/link/{hash}/clicks`.
#[derive(Debug, Default, Deserialize)]
pub struct ClicksQuery {
    /// Most recent clicks to return (clamped to 1..=1000).
    pub limit: Option<i64>,
}

/// Individual click event information.
///
/// Optional fields are omitted from JSON when `None` for cleaner responses.
#[derive(Debug, Serialize)]
pub struct ClickInfo {
    pub clicked_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

impl From<Click> for ClickInfo {
    fn from(click: Click) -> Self {
        Self {
            clicked_at: click.clicked_at,
            user_agent: click.user_agent,
            referer: click.referer,
            ip: click.ip,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClicksResponse {
    pub hash: String,
    pub items: Vec<ClickInfo>,
}
