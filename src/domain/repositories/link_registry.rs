//! Repository trait for per-link verification state.

use crate::domain::entities::{NewShortLink, QrStatus, Reachability, ShortLink};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Durable store of short links and their verification state.
///
/// Status setters are compare-and-write operations: a write is applied only
/// when it advances the link's state machine (see
/// [`Reachability::can_advance_to`] and [`QrStatus::can_advance_to`]).
/// Anything else is an idempotent no-op, so duplicate or late task
/// deliveries can never regress a terminal state.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRegistry`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryLinkRegistry`] - Per-key concurrent map
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRegistry: Send + Sync {
    /// Registers a new link with reachability `Pending`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the hash is already taken.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError>;

    /// Finds a link by hash.
    ///
    /// Safe to call concurrently with any writer; the returned record is a
    /// consistent snapshot.
    async fn get(&self, hash: &str) -> Result<Option<ShortLink>, AppError>;

    /// Records a reachability verdict.
    ///
    /// Returns `Ok(true)` if the write was applied and `Ok(false)` if it
    /// would not have advanced the state.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown hash.
    async fn set_reachability(&self, hash: &str, verdict: Reachability)
    -> Result<bool, AppError>;

    /// Records QR progress. Same semantics as [`LinkRegistry::set_reachability`].
    async fn set_qr_status(&self, hash: &str, status: QrStatus) -> Result<bool, AppError>;

    /// Lists links created before `created_before` whose reachability or QR
    /// status is still `Pending`, oldest first.
    async fn list_stale(
        &self,
        created_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<ShortLink>, AppError>;

    /// Checks that the backing store answers.
    async fn health_check(&self) -> bool;
}
