//! HTTP implementation of the reachability check.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::probe::{ProbeError, ReachabilityCheck};

/// Default bound for one attempt.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(5);

/// Issues a `GET` to the target and treats any 2xx as reachable.
///
/// Redirects are followed (up to reqwest's default of 10 hops), so a target
/// that answers `301 -> 200` counts as reachable. Environment proxies are
/// ignored; the check reports what this host can reach directly.
#[derive(Debug, Clone)]
pub struct HttpReachabilityCheck {
    client: reqwest::Client,
}

impl HttpReachabilityCheck {
    /// Builds a client whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Fails if the TLS backend cannot be initialized.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .no_proxy()
            .user_agent(concat!("shortgate/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ReachabilityCheck for HttpReachabilityCheck {
    async fn check(&self, target: &str) -> Result<(), ProbeError> {
        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(|e| ProbeError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ProbeError::BadStatus(status.as_u16()))
        }
    }
}
