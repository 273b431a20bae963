//! File storage for uploaded resources.
//!
//! Uploaded files are stored under `{ngo_key}/{resource_key}{ext}` and
//! served by URL from the configured base. The trait keeps handlers
//! independent of where the bytes actually land.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use crate::config::StorageConfig;
use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage path: {0}")]
    InvalidPath(String),
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// Backend-agnostic file store.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Whether a stored file exists at the relative path.
    async fn exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Writes the bytes at the relative path, creating parent
    /// directories as needed.
    async fn save(&self, path: &str, bytes: &[u8]) -> Result<(), StorageError>;

    /// Public URL for a stored file.
    fn url(&self, path: &str) -> String;
}

/// Storage path for a resource upload: `{ngo_key}/{resource_key}{ext}`.
/// `ext` carries its leading dot.
pub fn storage_path(ngo_key: &str, resource_key: &str, ext: &str) -> String {
    format!("{}/{}{}", ngo_key, resource_key, ext)
}

/// The lowercased extension of a filename, leading dot included.
pub fn file_extension(filename: &str) -> Option<String> {
    filename
        .rfind('.')
        .map(|idx| filename[idx..].to_lowercase())
}

/// Local-disk file store.
pub struct LocalFileStore {
    root: PathBuf,
    base_url: String,
}

impl LocalFileStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root: PathBuf::from(&config.root),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn full_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        // relative paths only; reject traversal components
        let rel = Path::new(path);
        if rel.is_absolute()
            || rel
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(rel))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        let full = self.full_path(path)?;
        Ok(tokio::fs::try_exists(&full).await?)
    }

    async fn save(&self, path: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let full = self.full_path(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::File::create(&full).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(root: &Path) -> LocalFileStore {
        LocalFileStore::new(&StorageConfig {
            root: root.to_string_lossy().into_owned(),
            base_url: "/media/".to_string(),
        })
    }

    #[test]
    fn test_storage_path_layout() {
        assert_eq!(
            storage_path("q1w2e3r4t5", "z9x8c7v6b5", ".png"),
            "q1w2e3r4t5/z9x8c7v6b5.png"
        );
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("photo.PNG").as_deref(), Some(".png"));
        assert_eq!(file_extension("drill.session.mp4").as_deref(), Some(".mp4"));
        assert_eq!(file_extension("noextension"), None);
    }

    #[test]
    fn test_url_strips_duplicate_slash() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        assert_eq!(store.url("a/b.png"), "/media/a/b.png");
    }

    #[test]
    fn test_rejects_traversal() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        assert!(store.full_path("../escape.txt").is_err());
        assert!(store.full_path("ngo/../../escape.txt").is_err());
        assert!(store.full_path("ngo/file.txt").is_ok());
    }

    #[tokio::test]
    async fn test_save_and_exists_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());

        assert!(!store.exists("ngo/file.txt").await.unwrap());
        store.save("ngo/file.txt", b"drill plan").await.unwrap();
        assert!(store.exists("ngo/file.txt").await.unwrap());

        let written = std::fs::read(tmp.path().join("ngo/file.txt")).unwrap();
        assert_eq!(written, b"drill plan");
    }
}
