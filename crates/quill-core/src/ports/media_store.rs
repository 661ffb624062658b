//! Storage port for uploaded media.

use async_trait::async_trait;

/// Where a stored file ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    pub filename: String,
    /// Public path the file is served from, e.g. `/uploads/<filename>`.
    pub url: String,
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Persist `bytes` under `filename`, creating the destination if needed.
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<StoredMedia, StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to prepare upload directory: {0}")]
    Directory(std::io::Error),

    #[error("Failed to write file: {0}")]
    Write(std::io::Error),
}
