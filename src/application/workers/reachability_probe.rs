//! Reachability verification with bounded retries.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::FixedInterval;

use crate::application::dispatcher::TaskHandler;
use crate::domain::VerificationTask;
use crate::domain::entities::Reachability;
use crate::domain::probe::ReachabilityCheck;
use crate::domain::repositories::LinkRegistry;
use crate::error::AppError;

/// Attempt budget for one verification.
#[derive(Debug, Clone, Copy)]
pub struct ProbePolicy {
    /// Total attempts, including the first one.
    pub max_attempts: usize,
    /// Pause between two consecutive attempts.
    pub retry_wait: Duration,
}

impl Default for ProbePolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_wait: Duration::from_secs(1),
        }
    }
}

/// Decides whether a link target is reachable and records the verdict.
///
/// The wait between attempts is a timer, not a blocked thread, so many
/// verifications can be in flight on a small worker pool.
pub struct ReachabilityProbe<R = dyn LinkRegistry, C = dyn ReachabilityCheck>
where
    R: LinkRegistry + ?Sized,
    C: ReachabilityCheck + ?Sized,
{
    registry: Arc<R>,
    check: Arc<C>,
    policy: ProbePolicy,
}

impl<R, C> ReachabilityProbe<R, C>
where
    R: LinkRegistry + ?Sized,
    C: ReachabilityCheck + ?Sized,
{
    pub fn new(registry: Arc<R>, check: Arc<C>, policy: ProbePolicy) -> Self {
        Self {
            registry,
            check,
            policy,
        }
    }

    /// Probes `target` until the first success or until the attempt budget
    /// runs out, then writes the verdict for `hash`.
    ///
    /// # Errors
    ///
    /// Only registry failures are returned. Network failures are part of
    /// the verdict.
    pub async fn verify(&self, hash: &str, target: &str) -> Result<Reachability, AppError> {
        let retries = self.policy.max_attempts.max(1) - 1;
        let strategy = FixedInterval::new(self.policy.retry_wait).take(retries);

        let mut attempt = 0usize;
        let outcome = Retry::spawn(strategy, || {
            attempt += 1;
            let attempt = attempt;
            let check = &self.check;
            async move {
                check.check(target).await.inspect_err(|e| {
                    tracing::debug!(hash, attempt, error = %e, "Reachability attempt failed");
                })
            }
        })
        .await;

        let verdict = match outcome {
            Ok(()) => Reachability::Reachable,
            Err(_) => Reachability::Unreachable,
        };

        let applied = self.registry.set_reachability(hash, verdict).await?;
        metrics::counter!("reachability_verdicts_total", "verdict" => verdict.as_str())
            .increment(1);
        tracing::info!(hash, verdict = %verdict, applied, "Reachability verified");

        Ok(verdict)
    }
}

#[async_trait]
impl<R, C> TaskHandler for ReachabilityProbe<R, C>
where
    R: LinkRegistry + ?Sized + 'static,
    C: ReachabilityCheck + ?Sized + 'static,
{
    async fn handle(&self, task: VerificationTask) -> Result<(), AppError> {
        self.verify(&task.hash, &task.payload).await.map(|_| ())
    }
}
