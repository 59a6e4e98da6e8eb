use async_trait::async_trait;
use serde_json::json;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::domain::repositories::QrStore;
use crate::error::AppError;
use crate::utils::code_generator::{generate_hash, is_well_formed};

/// Stores one file per hash under a directory.
///
/// Each write goes to its own temporary file and is renamed into place, so a
/// reader never sees a half-written image and overlapping writes for one
/// hash do not interfere. Hashes outside the URL-safe alphabet are rejected
/// before they reach the filesystem.
#[derive(Debug, Clone)]
pub struct FsQrStore {
    root: PathBuf,
}

impl FsQrStore {
    /// Creates the store, creating `root` if needed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the directory cannot be created.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, AppError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            AppError::internal(
                "Failed to create QR storage directory",
                json!({ "path": root.display().to_string(), "reason": e.to_string() }),
            )
        })?;
        Ok(Self { root })
    }

    fn path_for(&self, hash: &str) -> Result<PathBuf, AppError> {
        if !is_well_formed(hash) {
            return Err(AppError::bad_request(
                "Invalid hash format",
                json!({ "hash": hash }),
            ));
        }
        Ok(self.root.join(format!("{hash}.svg")))
    }
}

#[async_trait]
impl QrStore for FsQrStore {
    async fn put(&self, hash: &str, bytes: Vec<u8>) -> Result<(), AppError> {
        let path = self.path_for(hash)?;
        let tmp = self.root.join(format!(".{hash}.{}.tmp", generate_hash()?));

        let io_err = |e: std::io::Error| {
            AppError::internal(
                "Failed to write QR image",
                json!({ "hash": hash, "reason": e.to_string() }),
            )
        };
        let written = match tokio::fs::write(&tmp, bytes).await {
            Ok(()) => tokio::fs::rename(&tmp, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_err(e));
        }
        Ok(())
    }

    async fn get(&self, hash: &str) -> Result<Option<Vec<u8>>, AppError> {
        match tokio::fs::read(self.path_for(hash)?).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::internal(
                "Failed to read QR image",
                json!({ "hash": hash, "reason": e.to_string() }),
            )),
        }
    }
}
