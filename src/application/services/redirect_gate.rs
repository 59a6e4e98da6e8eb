//! Admission control for the redirect path.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::application::redirect_budget::RedirectBudget;
use crate::domain::RedirectOutcome;
use crate::domain::entities::Reachability;
use crate::domain::repositories::LinkRegistry;
use crate::error::AppError;
use crate::utils::code_generator::is_well_formed;

/// Decides what happens to one redirect request.
///
/// Checks run in a fixed order and stop at the first match:
///
/// 1. unknown hash - [`RedirectOutcome::NotFound`]
/// 2. reachability pending - [`RedirectOutcome::ComputationInProgress`]
/// 3. target unreachable - [`RedirectOutcome::Blocked`]
/// 4. quota exhausted - [`RedirectOutcome::RateLimited`]
/// 5. otherwise - [`RedirectOutcome::Redirect`]
///
/// A token is only taken at step 4, so polling a pending or blocked link
/// never eats into its quota. Verification is never started here.
pub struct RedirectGate<R = dyn LinkRegistry>
where
    R: LinkRegistry + ?Sized,
{
    registry: Arc<R>,
    budget: Arc<RedirectBudget>,
}

impl<R> RedirectGate<R>
where
    R: LinkRegistry + ?Sized,
{
    pub fn new(registry: Arc<R>, budget: Arc<RedirectBudget>) -> Self {
        Self { registry, budget }
    }

    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a malformed hash and
    /// [`AppError::Internal`] if the registry cannot be read.
    pub async fn resolve(&self, hash: &str) -> Result<RedirectOutcome, AppError> {
        if !is_well_formed(hash) {
            return Err(AppError::bad_request(
                "Malformed short hash",
                json!({ "hash": hash }),
            ));
        }

        let outcome = match self.registry.get(hash).await? {
            None => RedirectOutcome::NotFound,
            Some(link) => match link.reachability {
                Reachability::Pending => RedirectOutcome::ComputationInProgress,
                Reachability::Unreachable => RedirectOutcome::Blocked,
                Reachability::Reachable => {
                    // Buckets are process-local; rebuild from the stored limit.
                    if !self.budget.contains(&link.hash) {
                        self.budget.register(&link.hash, link.redirect_limit);
                    }

                    if self.budget.admit(&link.hash) {
                        RedirectOutcome::Redirect(link.target)
                    } else {
                        RedirectOutcome::RateLimited
                    }
                }
            },
        };

        metrics::counter!("redirect_outcomes_total", "outcome" => outcome.label()).increment(1);
        tracing::debug!(hash, outcome = outcome.label(), "Redirect resolved");

        Ok(outcome)
    }

    /// Time until a rate-limited link admits again.
    pub fn retry_after(&self, hash: &str) -> Option<Duration> {
        self.budget.retry_after(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{QrStatus, ShortLink};
    use crate::domain::repositories::MockLinkRegistry;
    use chrono::Utc;

    const WINDOW: Duration = Duration::from_secs(60);

    fn link(reachability: Reachability, limit: u32) -> ShortLink {
        ShortLink {
            hash: "abc".to_string(),
            target: "http://example.com/".to_string(),
            created_at: Utc::now(),
            redirect_limit: limit,
            reachability,
            qr: QrStatus::NotRequested,
        }
    }

    fn gate_for(found: Option<ShortLink>) -> (RedirectGate<MockLinkRegistry>, Arc<RedirectBudget>) {
        let mut registry = MockLinkRegistry::new();
        registry
            .expect_get()
            .returning(move |_| Ok(found.clone()));
        let budget = Arc::new(RedirectBudget::new(WINDOW));
        (RedirectGate::new(Arc::new(registry), budget.clone()), budget)
    }

    #[tokio::test]
    async fn test_unknown_hash_is_not_found() {
        let (gate, budget) = gate_for(None);

        assert_eq!(gate.resolve("abc").await.unwrap(), RedirectOutcome::NotFound);
        assert!(budget.is_empty());
    }

    #[tokio::test]
    async fn test_pending_link_consumes_no_tokens() {
        let (gate, budget) = gate_for(Some(link(Reachability::Pending, 1)));
        budget.register("abc", 1);

        for _ in 0..5 {
            assert_eq!(
                gate.resolve("abc").await.unwrap(),
                RedirectOutcome::ComputationInProgress
            );
        }
        assert_eq!(budget.consumed("abc"), 0);
    }

    #[tokio::test]
    async fn test_unreachable_link_is_blocked_without_consuming() {
        let (gate, budget) = gate_for(Some(link(Reachability::Unreachable, 1)));
        budget.register("abc", 1);

        assert_eq!(gate.resolve("abc").await.unwrap(), RedirectOutcome::Blocked);
        assert_eq!(budget.consumed("abc"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reachable_link_redirects_until_quota_runs_out() {
        let (gate, budget) = gate_for(Some(link(Reachability::Reachable, 2)));
        budget.register("abc", 2);

        for _ in 0..2 {
            assert_eq!(
                gate.resolve("abc").await.unwrap(),
                RedirectOutcome::Redirect("http://example.com/".to_string())
            );
        }
        assert_eq!(gate.resolve("abc").await.unwrap(), RedirectOutcome::RateLimited);
        assert_eq!(gate.retry_after("abc"), Some(WINDOW));

        tokio::time::advance(WINDOW).await;
        assert!(gate.resolve("abc").await.unwrap().is_redirect());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_bucket_is_rebuilt_from_stored_limit() {
        let (gate, budget) = gate_for(Some(link(Reachability::Reachable, 1)));

        assert!(gate.resolve("abc").await.unwrap().is_redirect());
        assert_eq!(gate.resolve("abc").await.unwrap(), RedirectOutcome::RateLimited);
        assert_eq!(budget.consumed("abc"), 1);
    }

    #[tokio::test]
    async fn test_unlimited_link_never_rate_limited() {
        let (gate, _) = gate_for(Some(link(Reachability::Reachable, 0)));

        for _ in 0..100 {
            assert!(gate.resolve("abc").await.unwrap().is_redirect());
        }
        assert_eq!(gate.retry_after("abc"), None);
    }

    #[tokio::test]
    async fn test_malformed_hash_is_rejected_before_lookup() {
        let mut registry = MockLinkRegistry::new();
        registry.expect_get().never();
        let gate = RedirectGate::new(Arc::new(registry), Arc::new(RedirectBudget::default()));

        let err = gate.resolve("bad.hash").await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_registry_failure_propagates() {
        let mut registry = MockLinkRegistry::new();
        registry
            .expect_get()
            .returning(|_| Err(AppError::internal("Database error", json!({}))));
        let gate = RedirectGate::new(Arc::new(registry), Arc::new(RedirectBudget::default()));

        assert!(gate.resolve("abc").await.is_err());
    }
}
