//! Decision returned by the redirect gate.

use serde::Serialize;

/// Result of admitting (or refusing) one redirect request.
///
/// Every variant except `Redirect` is a normal business state; callers map
/// them to transport responses instead of treating them as failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "target", rename_all = "snake_case")]
pub enum RedirectOutcome {
    /// The link is verified and the quota allowed this request.
    Redirect(String),
    /// No link is registered under the hash.
    NotFound,
    /// Reachability has not been decided yet; retry later.
    ComputationInProgress,
    /// The target failed verification; redirects are refused permanently.
    Blocked,
    /// The quota for the current window is used up.
    RateLimited,
}

impl RedirectOutcome {
    /// Stable label used for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Redirect(_) => "redirect",
            Self::NotFound => "not_found",
            Self::ComputationInProgress => "in_progress",
            Self::Blocked => "blocked",
            Self::RateLimited => "rate_limited",
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_distinct() {
        let labels = [
            RedirectOutcome::Redirect("https://example.com/".into()).label(),
            RedirectOutcome::NotFound.label(),
            RedirectOutcome::ComputationInProgress.label(),
            RedirectOutcome::Blocked.label(),
            RedirectOutcome::RateLimited.label(),
        ];
        let unique: std::collections::HashSet<_> = labels.iter().collect();
        assert_eq!(unique.len(), labels.len());
    }

    #[test]
    fn test_serialization_shape() {
        let json = serde_json::to_value(RedirectOutcome::Redirect("https://a.b/".into())).unwrap();
        assert_eq!(json["outcome"], "redirect");
        assert_eq!(json["target"], "https://a.b/");

        let json = serde_json::to_value(RedirectOutcome::Blocked).unwrap();
        assert_eq!(json["outcome"], "blocked");
    }
}
