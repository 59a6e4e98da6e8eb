//! Click history and system metrics service.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

use crate::domain::entities::Click;
use crate::domain::repositories::{ClickRepository, LinkRegistry};
use crate::error::AppError;

/// Most recent clicks returned per request.
pub const DEFAULT_CLICK_PAGE: i64 = 100;

/// Process and click counters for one link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemInfo {
    pub uptime_seconds: u64,
    /// Resident set size of this process; 0 if the platform does not report it.
    pub memory_used_bytes: u64,
    pub total_clicks: i64,
    pub link_clicks: i64,
}

/// Service for reading recorded clicks.
///
/// Clicks are written by the background click worker; this service only
/// reads them.
pub struct StatsService<C = dyn ClickRepository, R = dyn LinkRegistry>
where
    C: ClickRepository + ?Sized,
    R: LinkRegistry + ?Sized,
{
    clicks: Arc<C>,
    registry: Arc<R>,
    started_at: Instant,
    system: Mutex<System>,
}

impl<C, R> StatsService<C, R>
where
    C: ClickRepository + ?Sized,
    R: LinkRegistry + ?Sized,
{
    pub fn new(clicks: Arc<C>, registry: Arc<R>) -> Self {
        Self {
            clicks,
            registry,
            started_at: Instant::now(),
            system: Mutex::new(System::new()),
        }
    }

    /// Refreshes only this process and reads its resident memory.
    fn memory_used_bytes(&self) -> u64 {
        let pid = Pid::from_u32(std::process::id());
        let mut system = self.system.lock();
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        system.process(pid).map_or(0, |process| process.memory())
    }

    async fn ensure_link(&self, hash: &str) -> Result<(), AppError> {
        match self.registry.get(hash).await? {
            Some(_) => Ok(()),
            None => Err(AppError::link_not_found(hash)),
        }
    }

    /// Returns up to `limit` most recent clicks for a link, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches the hash.
    pub async fn clicks_for(&self, hash: &str, limit: i64) -> Result<Vec<Click>, AppError> {
        self.ensure_link(hash).await?;
        self.clicks.list_for(hash, limit.clamp(1, 1000)).await
    }

    /// Uptime, resident memory, and global and per-link click counts.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches the hash.
    pub async fn system_info(&self, hash: &str) -> Result<SystemInfo, AppError> {
        self.ensure_link(hash).await?;

        Ok(SystemInfo {
            uptime_seconds: self.started_at.elapsed().as_secs(),
            memory_used_bytes: self.memory_used_bytes(),
            total_clicks: self.clicks.count_all().await?,
            link_clicks: self.clicks.count_for(hash).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{NewShortLink, ShortLink};
    use crate::domain::repositories::{MockClickRepository, MockLinkRegistry};
    use chrono::Utc;

    fn registry_knowing(hash: &'static str) -> MockLinkRegistry {
        let mut registry = MockLinkRegistry::new();
        registry.expect_get().returning(move |h| {
            Ok((h == hash).then(|| {
                ShortLink::from_new(
                    NewShortLink {
                        hash: hash.to_string(),
                        target: "https://example.com/".to_string(),
                        redirect_limit: 0,
                        want_qr: false,
                    },
                    Utc::now(),
                )
            }))
        });
        registry
    }

    #[tokio::test]
    async fn test_clicks_for_clamps_limit() {
        let mut clicks = MockClickRepository::new();
        clicks
            .expect_list_for()
            .withf(|hash, limit| hash == "abc" && *limit == 1000)
            .times(1)
            .returning(|_, _| Ok(vec![]));

        let service = StatsService::new(Arc::new(clicks), Arc::new(registry_knowing("abc")));

        assert!(service.clicks_for("abc", 50_000).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clicks_for_unknown_link() {
        let mut clicks = MockClickRepository::new();
        clicks.expect_list_for().never();

        let service = StatsService::new(Arc::new(clicks), Arc::new(registry_knowing("abc")));

        let err = service.clicks_for("other", 10).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_system_info_counts() {
        let mut clicks = MockClickRepository::new();
        clicks.expect_count_all().returning(|| Ok(42));
        clicks
            .expect_count_for()
            .withf(|hash| hash == "abc")
            .returning(|_| Ok(7));

        let service = StatsService::new(Arc::new(clicks), Arc::new(registry_knowing("abc")));
        let info = service.system_info("abc").await.unwrap();

        assert_eq!(info.total_clicks, 42);
        assert_eq!(info.link_clicks, 7);
        assert_eq!(info.uptime_seconds, 0);
    }

    #[tokio::test]
    async fn test_system_info_reports_process_memory() {
        let mut clicks = MockClickRepository::new();
        clicks.expect_count_all().returning(|| Ok(0));
        clicks.expect_count_for().returning(|_| Ok(0));

        let service = StatsService::new(Arc::new(clicks), Arc::new(registry_knowing("abc")));
        let info = service.system_info("abc").await.unwrap();

        if sysinfo::IS_SUPPORTED_SYSTEM {
            assert!(info.memory_used_bytes > 0);
        }
    }
}
