use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::repositories::QrStore;
use crate::error::AppError;

/// QR images held in process memory.
#[derive(Debug, Default)]
pub struct MemoryQrStore {
    images: DashMap<String, Vec<u8>>,
}

impl MemoryQrStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QrStore for MemoryQrStore {
    async fn put(&self, hash: &str, bytes: Vec<u8>) -> Result<(), AppError> {
        self.images.insert(hash.to_string(), bytes);
        Ok(())
    }

    async fn get(&self, hash: &str) -> Result<Option<Vec<u8>>, AppError> {
        Ok(self.images.get(hash).map(|bytes| bytes.clone()))
    }
}
