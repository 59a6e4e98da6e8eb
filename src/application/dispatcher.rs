//! In-process verification task queue.
//!
//! Each [`TaskKind`] gets its own bounded channel. Publishing never blocks;
//! a subscriber drains the channel with a bounded pool of concurrent
//! handlers. Handler failures and panics are logged and the task is dropped,
//! leaving the link `Pending`.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::{JoinError, JoinHandle, JoinSet};

use crate::domain::{TaskKind, VerificationTask};
use crate::error::AppError;

/// Publishing or subscribing failed.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("{kind} queue is full")]
    QueueFull { kind: TaskKind },

    #[error("{kind} queue is closed")]
    QueueClosed { kind: TaskKind },

    #[error("{kind} queue already has a subscriber")]
    AlreadySubscribed { kind: TaskKind },
}

/// Consumer of one task kind.
#[async_trait]
pub trait TaskHandler: Send + Sync + 'static {
    async fn handle(&self, task: VerificationTask) -> Result<(), AppError>;
}

pub struct VerificationDispatcher {
    senders: HashMap<TaskKind, mpsc::Sender<VerificationTask>>,
    /// Receivers not yet claimed by [`VerificationDispatcher::subscribe`].
    receivers: Mutex<HashMap<TaskKind, mpsc::Receiver<VerificationTask>>>,
    /// Tasks queued through [`VerificationDispatcher::publish_once`] that no
    /// handler has finished yet.
    outstanding: Arc<DashMap<(TaskKind, String), ()>>,
}

impl VerificationDispatcher {
    /// Creates one queue of `capacity` slots per task kind.
    pub fn new(capacity: usize) -> Self {
        let mut senders = HashMap::new();
        let mut receivers = HashMap::new();
        for kind in TaskKind::ALL {
            let (tx, rx) = mpsc::channel(capacity.max(1));
            senders.insert(kind, tx);
            receivers.insert(kind, rx);
        }

        Self {
            senders,
            receivers: Mutex::new(receivers),
            outstanding: Arc::new(DashMap::new()),
        }
    }

    /// Enqueues a task without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::QueueFull`] or [`DispatchError::QueueClosed`].
    /// The task is dropped in both cases.
    pub fn publish(&self, task: VerificationTask) -> Result<(), DispatchError> {
        let kind = task.kind;
        let hash = task.hash.clone();

        let result = match self.senders.get(&kind) {
            Some(tx) => tx.try_send(task).map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => DispatchError::QueueFull { kind },
                mpsc::error::TrySendError::Closed(_) => DispatchError::QueueClosed { kind },
            }),
            None => Err(DispatchError::QueueClosed { kind }),
        };

        match &result {
            Ok(()) => {
                tracing::debug!(hash = %hash, kind = %kind, "Verification task published");
            }
            Err(e) => {
                metrics::counter!("dispatch_failures_total", "kind" => kind.as_str()).increment(1);
                tracing::warn!(hash = %hash, kind = %kind, error = %e, "Failed to publish verification task");
            }
        }

        result
    }

    /// Enqueues a task unless one for the same kind and hash, published
    /// through this method, is still queued or running.
    ///
    /// Returns `Ok(false)` when the task was skipped as a duplicate.
    ///
    /// # Errors
    ///
    /// Same as [`VerificationDispatcher::publish`].
    pub fn publish_once(&self, task: VerificationTask) -> Result<bool, DispatchError> {
        let key = (task.kind, task.hash.clone());
        match self.outstanding.entry(key.clone()) {
            Entry::Occupied(_) => {
                tracing::debug!(hash = %key.1, kind = %key.0, "Verification task already outstanding");
                return Ok(false);
            }
            Entry::Vacant(slot) => {
                slot.insert(());
            }
        }

        match self.publish(task) {
            Ok(()) => Ok(true),
            Err(e) => {
                self.outstanding.remove(&key);
                Err(e)
            }
        }
    }

    /// Starts the consumer group for `kind` with up to `concurrency`
    /// handlers in flight.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::AlreadySubscribed`] on a second subscription
    /// for the same kind.
    pub fn subscribe(
        &self,
        kind: TaskKind,
        handler: Arc<dyn TaskHandler>,
        concurrency: usize,
    ) -> Result<JoinHandle<()>, DispatchError> {
        let rx = self
            .receivers
            .lock()
            .remove(&kind)
            .ok_or(DispatchError::AlreadySubscribed { kind })?;

        let concurrency = concurrency.max(1);
        tracing::info!(kind = %kind, concurrency, "Verification workers started");

        Ok(tokio::spawn(run_workers(
            kind,
            rx,
            handler,
            concurrency,
            self.outstanding.clone(),
        )))
    }

    /// Returns false once the consumer side of `kind` is gone.
    pub fn is_open(&self, kind: TaskKind) -> bool {
        self.senders.get(&kind).is_some_and(|tx| !tx.is_closed())
    }

    /// Number of queued tasks of `kind` not yet picked up.
    pub fn queue_depth(&self, kind: TaskKind) -> usize {
        self.senders
            .get(&kind)
            .map_or(0, |tx| tx.max_capacity() - tx.capacity())
    }
}

async fn run_workers(
    kind: TaskKind,
    mut rx: mpsc::Receiver<VerificationTask>,
    handler: Arc<dyn TaskHandler>,
    concurrency: usize,
    outstanding: Arc<DashMap<(TaskKind, String), ()>>,
) {
    let permits = Arc::new(Semaphore::new(concurrency));
    let mut in_flight: JoinSet<(String, Result<(), AppError>)> = JoinSet::new();

    loop {
        tokio::select! {
            received = rx.recv() => {
                let Some(task) = received else { break };
                let Ok(permit) = permits.clone().acquire_owned().await else { break };

                let handler = handler.clone();
                let outstanding = outstanding.clone();
                in_flight.spawn(async move {
                    let _permit = permit;
                    let key = (task.kind, task.hash.clone());
                    let result = handler.handle(task).await;
                    outstanding.remove(&key);
                    (key.1, result)
                });
            }
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                log_completion(kind, joined);
            }
        }
    }

    while let Some(joined) = in_flight.join_next().await {
        log_completion(kind, joined);
    }
    tracing::info!(kind = %kind, "Verification workers stopped");
}

fn log_completion(kind: TaskKind, joined: Result<(String, Result<(), AppError>), JoinError>) {
    match joined {
        Ok((hash, Ok(()))) => {
            tracing::debug!(hash = %hash, kind = %kind, "Verification task done");
        }
        Ok((hash, Err(e))) => {
            metrics::counter!("verification_failures_total", "kind" => kind.as_str())
                .increment(1);
            tracing::warn!(hash = %hash, kind = %kind, error = %e, "Verification task failed, link stays pending");
        }
        Err(e) if e.is_panic() => {
            metrics::counter!("verification_failures_total", "kind" => kind.as_str())
                .increment(1);
            tracing::error!(kind = %kind, "Verification handler panicked");
        }
        Err(e) => {
            tracing::warn!(kind = %kind, error = %e, "Verification task cancelled");
        }
    }
}
