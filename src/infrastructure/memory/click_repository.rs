use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::entities::{Click, NewClick};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

/// Append-only click log kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryClickRepository {
    clicks: Mutex<Vec<Click>>,
}

impl MemoryClickRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClickRepository for MemoryClickRepository {
    async fn record(&self, click: NewClick) -> Result<Click, AppError> {
        let mut clicks = self.clicks.lock();
        let click = Click {
            id: clicks.len() as i64 + 1,
            hash: click.hash,
            clicked_at: click.clicked_at,
            user_agent: click.user_agent,
            referer: click.referer,
            ip: click.ip,
        };
        clicks.push(click.clone());
        Ok(click)
    }

    async fn list_for(&self, hash: &str, limit: i64) -> Result<Vec<Click>, AppError> {
        let clicks = self.clicks.lock();
        Ok(clicks
            .iter()
            .rev()
            .filter(|c| c.hash == hash)
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn count_for(&self, hash: &str) -> Result<i64, AppError> {
        Ok(self.clicks.lock().iter().filter(|c| c.hash == hash).count() as i64)
    }

    async fn count_all(&self) -> Result<i64, AppError> {
        Ok(self.clicks.lock().len() as i64)
    }
}
