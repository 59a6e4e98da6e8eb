use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use crate::application::dispatcher::TaskHandler;
use crate::domain::VerificationTask;
use crate::domain::entities::QrStatus;
use crate::domain::qr::QrEncoder;
use crate::domain::repositories::{LinkRegistry, QrStore};
use crate::error::AppError;

/// Renders and stores the QR image for a link's public URL.
///
/// Only the `qr` field is touched, so this runs safely alongside the
/// reachability probe for the same link. Re-running is harmless: the encoder
/// is deterministic and the store overwrites.
pub struct QrWorker<R = dyn LinkRegistry, S = dyn QrStore>
where
    R: LinkRegistry + ?Sized,
    S: QrStore + ?Sized,
{
    registry: Arc<R>,
    store: Arc<S>,
    encoder: Arc<dyn QrEncoder>,
}

impl<R, S> QrWorker<R, S>
where
    R: LinkRegistry + ?Sized,
    S: QrStore + ?Sized,
{
    pub fn new(registry: Arc<R>, store: Arc<S>, encoder: Arc<dyn QrEncoder>) -> Self {
        Self {
            registry,
            store,
            encoder,
        }
    }

    /// Marks the QR pending, renders `public_url`, stores the bytes under
    /// `hash` and marks the QR ready.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown hash and
    /// [`AppError::Internal`] on rendering or storage failures. The status
    /// then stays `Pending`.
    pub async fn generate(&self, hash: &str, public_url: &str) -> Result<(), AppError> {
        self.registry.set_qr_status(hash, QrStatus::Pending).await?;

        let bytes = self.encoder.render(public_url).map_err(|e| {
            AppError::internal(
                "Failed to render QR code",
                json!({ "hash": hash, "reason": e.to_string() }),
            )
        })?;
        let size = bytes.len();
        self.store.put(hash, bytes).await?;

        self.registry.set_qr_status(hash, QrStatus::Ready).await?;
        metrics::counter!("qr_codes_generated_total").increment(1);
        tracing::info!(hash, size, "QR code ready");

        Ok(())
    }
}

#[async_trait]
impl<R, S> TaskHandler for QrWorker<R, S>
where
    R: LinkRegistry + ?Sized + 'static,
    S: QrStore + ?Sized + 'static,
{
    async fn handle(&self, task: VerificationTask) -> Result<(), AppError> {
        self.generate(&task.hash, &task.payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::NewShortLink;
    use crate::domain::qr::QrError;
    use crate::domain::repositories::MockQrStore;
    use crate::infrastructure::memory::{MemoryLinkRegistry, MemoryQrStore};
    use crate::infrastructure::qr::SvgQrEncoder;

    async fn registry_with(hash: &str, want_qr: bool) -> Arc<MemoryLinkRegistry> {
        let registry = Arc::new(MemoryLinkRegistry::new());
        registry
            .create(NewShortLink {
                hash: hash.to_string(),
                target: "https://example.com/".to_string(),
                redirect_limit: 0,
                want_qr,
            })
            .await
            .unwrap();
        registry
    }

    struct FailingEncoder;

    impl QrEncoder for FailingEncoder {
        fn render(&self, _data: &str) -> Result<Vec<u8>, QrError> {
            Err(QrError("data too long".to_string()))
        }

        fn content_type(&self) -> &'static str {
            "image/svg+xml"
        }
    }

    #[tokio::test]
    async fn test_generate_marks_ready_and_stores_image() {
        let registry = registry_with("abc", true).await;
        let store = Arc::new(MemoryQrStore::new());
        let worker = QrWorker::new(registry.clone(), store.clone(), Arc::new(SvgQrEncoder::default()));

        worker
            .generate("abc", "http://localhost:3000/abc")
            .await
            .unwrap();

        let link = registry.get("abc").await.unwrap().unwrap();
        assert_eq!(link.qr, QrStatus::Ready);
        assert!(store.get("abc").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_generate_twice_is_idempotent() {
        let registry = registry_with("abc", true).await;
        let store = Arc::new(MemoryQrStore::new());
        let worker = QrWorker::new(registry.clone(), store.clone(), Arc::new(SvgQrEncoder::default()));

        worker.generate("abc", "http://localhost:3000/abc").await.unwrap();
        let first = store.get("abc").await.unwrap().unwrap();
        worker.generate("abc", "http://localhost:3000/abc").await.unwrap();
        let second = store.get("abc").await.unwrap().unwrap();

        assert_eq!(first, second);
        assert_eq!(
            registry.get("abc").await.unwrap().unwrap().qr,
            QrStatus::Ready
        );
    }

    #[tokio::test]
    async fn test_render_failure_leaves_status_pending() {
        let registry = registry_with("abc", true).await;
        let worker = QrWorker::new(
            registry.clone(),
            Arc::new(MemoryQrStore::new()),
            Arc::new(FailingEncoder),
        );

        assert!(worker.generate("abc", "http://localhost:3000/abc").await.is_err());
        assert_eq!(
            registry.get("abc").await.unwrap().unwrap().qr,
            QrStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_storage_failure_is_reported() {
        let registry = registry_with("abc", true).await;
        let mut store = MockQrStore::new();
        store
            .expect_put()
            .returning(|_, _| Err(AppError::internal("disk full", json!({}))));

        let worker = QrWorker::new(registry.clone(), Arc::new(store), Arc::new(SvgQrEncoder::default()));

        assert!(worker.generate("abc", "http://localhost:3000/abc").await.is_err());
        assert_eq!(
            registry.get("abc").await.unwrap().unwrap().qr,
            QrStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_unknown_hash_fails_before_rendering() {
        let registry = Arc::new(MemoryLinkRegistry::new());
        let mut store = MockQrStore::new();
        store.expect_put().never();

        let worker = QrWorker::new(registry, Arc::new(store), Arc::new(SvgQrEncoder::default()));

        let err = worker.generate("ghost", "http://localhost:3000/ghost").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }
}
