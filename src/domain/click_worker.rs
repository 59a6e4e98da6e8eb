//! Background worker persisting click events.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::NewClick;
use crate::domain::repositories::ClickRepository;

/// Retries after the first failed insert.
const MAX_RETRIES: usize = 3;

/// Drains the click channel until every sender is dropped.
///
/// Each insert is retried with jittered exponential backoff (10 ms, 100 ms,
/// 1 s). A click that still fails is dropped with a warning; redirects never
/// wait on this worker.
pub async fn run_click_worker(
    mut rx: mpsc::Receiver<ClickEvent>,
    repository: Arc<dyn ClickRepository>,
) {
    while let Some(event) = rx.recv().await {
        let hash = event.hash.clone();
        let click = NewClick::from(event);

        let strategy = ExponentialBackoff::from_millis(10)
            .max_delay(Duration::from_secs(1))
            .map(jitter)
            .take(MAX_RETRIES);

        let result = Retry::spawn(strategy, || {
            let repository = repository.clone();
            let click = click.clone();
            async move { repository.record(click).await }
        })
        .await;

        match result {
            Ok(_) => metrics::counter!("clicks_recorded_total").increment(1),
            Err(e) => {
                metrics::counter!("clicks_dropped_total").increment(1);
                tracing::warn!(hash = %hash, error = %e, "Dropping click after retries");
            }
        }
    }

    tracing::info!("Click worker stopped");
}
