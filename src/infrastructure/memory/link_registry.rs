use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::domain::entities::{NewShortLink, QrStatus, Reachability, ShortLink};
use crate::domain::repositories::LinkRegistry;
use crate::error::AppError;

/// Link registry backed by a per-key concurrent map.
///
/// Used when no database is configured and by handler tests. Contents are
/// lost on restart.
#[derive(Debug, Default)]
pub struct MemoryLinkRegistry {
    links: DashMap<String, ShortLink>,
}

impl MemoryLinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[async_trait]
impl LinkRegistry for MemoryLinkRegistry {
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        match self.links.entry(new_link.hash.clone()) {
            Entry::Occupied(_) => Err(AppError::hash_taken(&new_link.hash)),
            Entry::Vacant(slot) => {
                let link = ShortLink::from_new(new_link, Utc::now());
                slot.insert(link.clone());
                Ok(link)
            }
        }
    }

    async fn get(&self, hash: &str) -> Result<Option<ShortLink>, AppError> {
        Ok(self.links.get(hash).map(|link| link.clone()))
    }

    async fn set_reachability(
        &self,
        hash: &str,
        verdict: Reachability,
    ) -> Result<bool, AppError> {
        let mut link = self
            .links
            .get_mut(hash)
            .ok_or_else(|| AppError::link_not_found(hash))?;

        if !link.reachability.can_advance_to(verdict) {
            return Ok(false);
        }
        link.reachability = verdict;
        Ok(true)
    }

    async fn set_qr_status(&self, hash: &str, status: QrStatus) -> Result<bool, AppError> {
        let mut link = self
            .links
            .get_mut(hash)
            .ok_or_else(|| AppError::link_not_found(hash))?;

        if !link.qr.can_advance_to(status) {
            return Ok(false);
        }
        link.qr = status;
        Ok(true)
    }

    async fn list_stale(
        &self,
        created_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<ShortLink>, AppError> {
        let mut stale: Vec<ShortLink> = self
            .links
            .iter()
            .filter(|link| {
                link.created_at < created_before
                    && (link.reachability == Reachability::Pending
                        || link.qr == QrStatus::Pending)
            })
            .map(|link| link.clone())
            .collect();

        stale.sort_by_key(|link| link.created_at);
        stale.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(stale)
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::Arc;

    fn new_link(hash: &str, want_qr: bool) -> NewShortLink {
        NewShortLink {
            hash: hash.to_string(),
            target: "https://example.com/".to_string(),
            redirect_limit: 0,
            want_qr,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let registry = MemoryLinkRegistry::new();
        let created = registry.create(new_link("abc", false)).await.unwrap();

        let found = registry.get("abc").await.unwrap().unwrap();
        assert_eq!(found, created);
        assert_eq!(found.reachability, Reachability::Pending);
        assert!(registry.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_hash_conflicts() {
        let registry = MemoryLinkRegistry::new();
        registry.create(new_link("abc", false)).await.unwrap();

        let err = registry.create(new_link("abc", true)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_terminal_reachability_is_sticky() {
        let registry = MemoryLinkRegistry::new();
        registry.create(new_link("abc", false)).await.unwrap();

        assert!(
            registry
                .set_reachability("abc", Reachability::Unreachable)
                .await
                .unwrap()
        );
        assert!(
            !registry
                .set_reachability("abc", Reachability::Reachable)
                .await
                .unwrap()
        );
        assert!(
            !registry
                .set_reachability("abc", Reachability::Pending)
                .await
                .unwrap()
        );

        let link = registry.get("abc").await.unwrap().unwrap();
        assert_eq!(link.reachability, Reachability::Unreachable);
    }

    #[tokio::test]
    async fn test_qr_status_never_regresses() {
        let registry = MemoryLinkRegistry::new();
        registry.create(new_link("abc", true)).await.unwrap();

        assert!(!registry.set_qr_status("abc", QrStatus::Pending).await.unwrap());
        assert!(registry.set_qr_status("abc", QrStatus::Ready).await.unwrap());
        assert!(!registry.set_qr_status("abc", QrStatus::Pending).await.unwrap());
        assert!(!registry.set_qr_status("abc", QrStatus::Ready).await.unwrap());
    }

    #[tokio::test]
    async fn test_setters_on_unknown_hash_fail() {
        let registry = MemoryLinkRegistry::new();

        let err = registry
            .set_reachability("ghost", Reachability::Reachable)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
        assert!(registry.set_qr_status("ghost", QrStatus::Ready).await.is_err());
    }

    #[tokio::test]
    async fn test_list_stale_filters_settled_links() {
        let registry = MemoryLinkRegistry::new();
        registry.create(new_link("pending", false)).await.unwrap();
        registry.create(new_link("qr-pending", true)).await.unwrap();
        registry.create(new_link("settled", false)).await.unwrap();
        registry
            .set_reachability("qr-pending", Reachability::Reachable)
            .await
            .unwrap();
        registry
            .set_reachability("settled", Reachability::Reachable)
            .await
            .unwrap();

        let cutoff = Utc::now() + Duration::seconds(1);
        let mut hashes: Vec<String> = registry
            .list_stale(cutoff, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.hash)
            .collect();
        hashes.sort();
        assert_eq!(hashes, vec!["pending", "qr-pending"]);

        let past = Utc::now() - Duration::hours(1);
        assert!(registry.list_stale(past, 10).await.unwrap().is_empty());
        assert_eq!(registry.list_stale(cutoff, 1).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_verdicts_apply_once() {
        let registry = Arc::new(MemoryLinkRegistry::new());
        registry.create(new_link("abc", false)).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..16 {
            let registry = registry.clone();
            let verdict = if i % 2 == 0 {
                Reachability::Reachable
            } else {
                Reachability::Unreachable
            };
            handles.push(tokio::spawn(async move {
                registry.set_reachability("abc", verdict).await.unwrap()
            }));
        }

        let mut applied = 0;
        for handle in handles {
            if handle.await.unwrap() {
                applied += 1;
            }
        }
        assert_eq!(applied, 1);
    }
}
