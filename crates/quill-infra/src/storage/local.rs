//! Local-disk media store. Files are written once and served statically.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use quill_core::ports::{MediaStore, StorageError, StoredMedia};

/// Writes uploads into a directory that is exposed under `public_prefix`.
#[derive(Debug, Clone)]
pub struct LocalMediaStore {
    root: PathBuf,
    public_prefix: String,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_prefix: public_prefix.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<StoredMedia, StorageError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(StorageError::Directory)?;

        // Generated names never contain separators; keep it that way.
        let name = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                StorageError::Write(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "invalid file name",
                ))
            })?;

        let path = self.root.join(name);
        fs::write(&path, bytes).await.map_err(StorageError::Write)?;

        tracing::info!(path = %path.display(), size = bytes.len(), "Stored upload");

        Ok(StoredMedia {
            filename: name.to_string(),
            url: format!("{}/{}", self.public_prefix, name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(tmp.path().join("uploads"), "/uploads/");

        let stored = store.save("1700000000_deadbeef.png", b"data").await.unwrap();

        assert_eq!(stored.url, "/uploads/1700000000_deadbeef.png");
        let written = std::fs::read(tmp.path().join("uploads").join(&stored.filename)).unwrap();
        assert_eq!(written, b"data");
    }

    #[tokio::test]
    async fn test_save_strips_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(tmp.path(), "/uploads");

        let stored = store.save("../escape.png", b"x").await.unwrap();

        assert_eq!(stored.filename, "escape.png");
        assert!(tmp.path().join("escape.png").exists());
    }
}
