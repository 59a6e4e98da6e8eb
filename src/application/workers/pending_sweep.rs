//! Periodic re-publication of verification work for stuck links.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

use crate::application::dispatcher::VerificationDispatcher;
use crate::application::services::link_service::public_url;
use crate::domain::VerificationTask;
use crate::domain::entities::{QrStatus, Reachability};
use crate::domain::repositories::LinkRegistry;
use crate::error::AppError;

/// Upper bound of links re-published per sweep.
const SWEEP_BATCH: i64 = 500;

/// Recovers links whose tasks were lost (full queue, crash, restart).
///
/// Both workers are idempotent, so re-publishing a task that is merely slow
/// does no harm.
pub struct PendingSweep {
    registry: Arc<dyn LinkRegistry>,
    dispatcher: Arc<VerificationDispatcher>,
    base_url: String,
    stale_after: Duration,
}

impl PendingSweep {
    pub fn new(
        registry: Arc<dyn LinkRegistry>,
        dispatcher: Arc<VerificationDispatcher>,
        base_url: impl Into<String>,
        stale_after: Duration,
    ) -> Self {
        Self {
            registry,
            dispatcher,
            base_url: base_url.into(),
            stale_after,
        }
    }

    /// Re-publishes tasks for links pending longer than `stale_after`.
    ///
    /// Returns the number of tasks accepted by the dispatcher. Stops early
    /// once a queue is full.
    pub async fn sweep_once(&self) -> Result<usize, AppError> {
        let stale_after = chrono::Duration::from_std(self.stale_after)
            .unwrap_or(chrono::Duration::MAX);
        let cutoff = Utc::now()
            .checked_sub_signed(stale_after)
            .unwrap_or(chrono::DateTime::<Utc>::MIN_UTC);

        let stale = self.registry.list_stale(cutoff, SWEEP_BATCH).await?;
        let mut published = 0;

        for link in stale {
            let mut tasks = Vec::with_capacity(2);
            if link.reachability == Reachability::Pending {
                tasks.push(VerificationTask::reachability(&link.hash, &link.target));
            }
            if link.qr == QrStatus::Pending {
                tasks.push(VerificationTask::qr(
                    &link.hash,
                    public_url(&self.base_url, &link.hash),
                ));
            }

            for task in tasks {
                if self.dispatcher.publish(task).is_err() {
                    tracing::warn!(published, "Sweep stopped: verification queue full");
                    return Ok(published);
                }
                published += 1;
            }
        }

        if published > 0 {
            tracing::info!(published, "Re-published verification tasks for stale links");
        }
        Ok(published)
    }

    /// Runs [`Self::sweep_once`] every `period` until the task is aborted.
    pub async fn run(self, period: Duration) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick fires immediately; nothing is stale at startup yet.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if let Err(e) = self.sweep_once().await {
                tracing::warn!(error = %e, "Pending sweep failed");
            }
        }
    }
}
