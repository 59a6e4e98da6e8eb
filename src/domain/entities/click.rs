//! Click entity representing a single admitted redirect.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A click recorded after the redirect gate admitted a request.
///
/// Captures raw client metadata. Geolocation and user-agent classification
/// are left to downstream analytics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Click {
    pub id: i64,
    pub hash: String,
    pub clicked_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub ip: Option<String>,
}

/// Input data for recording a new click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClick {
    pub hash: String,
    pub clicked_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub ip: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_serializes_optional_fields_as_null() {
        let click = Click {
            id: 7,
            hash: "abc123".to_string(),
            clicked_at: Utc::now(),
            user_agent: None,
            referer: None,
            ip: Some("10.0.0.1".to_string()),
        };

        let json = serde_json::to_value(&click).unwrap();
        assert_eq!(json["hash"], "abc123");
        assert!(json["user_agent"].is_null());
        assert_eq!(json["ip"], "10.0.0.1");
    }
}
