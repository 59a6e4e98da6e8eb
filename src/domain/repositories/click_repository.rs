//! Repository trait for recorded clicks.

use crate::domain::entities::{Click, NewClick};
use crate::error::AppError;
use async_trait::async_trait;

/// Storage for admitted redirects.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgClickRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryClickRepository`] - In-process storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Persists a click.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn record(&self, click: NewClick) -> Result<Click, AppError>;

    /// Returns the most recent clicks for a link, newest first.
    async fn list_for(&self, hash: &str, limit: i64) -> Result<Vec<Click>, AppError>;

    /// Counts clicks recorded for one link.
    async fn count_for(&self, hash: &str) -> Result<i64, AppError>;

    /// Counts all recorded clicks.
    async fn count_all(&self) -> Result<i64, AppError>;
}
