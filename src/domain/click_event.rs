//! Click event model for asynchronous click recording.

use chrono::{DateTime, Utc};

use crate::domain::entities::NewClick;

/// An in-memory click event passed from the redirect handler to the click worker.
///
/// Sent over a bounded channel so the redirect response never waits on the
/// database. Client metadata is optional to tolerate missing headers.
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub hash: String,
    pub clicked_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub ip: Option<String>,
}

impl ClickEvent {
    /// Creates a click event stamped with the current time.
    pub fn new(
        hash: String,
        ip: Option<String>,
        user_agent: Option<&str>,
        referer: Option<&str>,
    ) -> Self {
        Self {
            hash,
            clicked_at: Utc::now(),
            ip,
            user_agent: user_agent.map(|s| s.to_string()),
            referer: referer.map(|s| s.to_string()),
        }
    }
}

impl From<ClickEvent> for NewClick {
    fn from(ev: ClickEvent) -> Self {
        NewClick {
            hash: ev.hash,
            clicked_at: ev.clicked_at,
            user_agent: ev.user_agent,
            referer: ev.referer,
            ip: ev.ip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_event_creation_full() {
        let event = ClickEvent::new(
            "abc123".to_string(),
            Some("192.168.1.1".to_string()),
            Some("Mozilla/5.0"),
            Some("https://google.com"),
        );

        assert_eq!(event.hash, "abc123");
        assert_eq!(event.ip, Some("192.168.1.1".to_string()));
        assert_eq!(event.user_agent, Some("Mozilla/5.0".to_string()));
        assert_eq!(event.referer, Some("https://google.com".to_string()));
    }

    #[test]
    fn test_click_event_creation_minimal() {
        let event = ClickEvent::new("xyz".to_string(), None, None, None);

        assert_eq!(event.hash, "xyz");
        assert!(event.ip.is_none());
        assert!(event.user_agent.is_none());
        assert!(event.referer.is_none());
    }

    #[test]
    fn test_into_new_click_keeps_timestamp() {
        let event = ClickEvent::new("h".to_string(), None, Some("curl/8"), None);
        let at = event.clicked_at;

        let click: NewClick = event.into();
        assert_eq!(click.clicked_at, at);
        assert_eq!(click.user_agent.as_deref(), Some("curl/8"));
    }
}
