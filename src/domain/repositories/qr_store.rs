//! Storage trait for rendered QR images.

use crate::error::AppError;
use async_trait::async_trait;

/// Keyed blob storage for QR images.
///
/// `put` overwrites, which keeps re-rendering idempotent.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QrStore: Send + Sync {
    async fn put(&self, hash: &str, bytes: Vec<u8>) -> Result<(), AppError>;

    async fn get(&self, hash: &str) -> Result<Option<Vec<u8>>, AppError>;
}
