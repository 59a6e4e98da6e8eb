//! Port for the single network round-trip behind a reachability check.

use async_trait::async_trait;

/// Why one reachability attempt failed.
///
/// Both variants are treated identically by the prober: the attempt is
/// counted as failed and retried. The distinction only matters for logs.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("target answered with status {0}")]
    BadStatus(u16),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Performs one attempt to reach a target URL.
///
/// Implementations must bound the attempt with their own timeout.
///
/// # Implementations
///
/// - [`crate::infrastructure::http_check::HttpReachabilityCheck`] - `reqwest` GET
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReachabilityCheck: Send + Sync {
    /// Returns `Ok(())` when the target answered with a 2xx status.
    async fn check(&self, target: &str) -> Result<(), ProbeError>;
}
