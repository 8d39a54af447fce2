use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::errors::AppError;

/// URL prefix the local blob directory is served under.
pub const FILES_MOUNT: &str = "/files";

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key` and return the URL the file can be fetched from.
    /// Existing keys are never overwritten.
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<String, AppError>;
}

/// Blob store backed by a directory that actix-files serves under `/files`.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn url_for(&self, key: &str) -> String {
        format!("{}{}/{}", self.base_url, FILES_MOUNT, key)
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, AppError> {
        let rel = Path::new(key);
        let safe = !key.is_empty()
            && rel.components().all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(AppError::Storage(format!("Refusing blob key {key:?}")));
        }
        Ok(self.root.join(rel))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<String, AppError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        log::debug!("Stored blob {key} ({} bytes, {content_type})", bytes.len());
        Ok(self.url_for(key))
    }
}

/// Build the storage key for a question attachment: `<id>/<millis>.<ext>`.
/// The extension comes from the uploaded file name, reduced to ASCII
/// alphanumerics; files without a usable extension get `bin`.
pub fn attachment_key(question_id: i64, file_name: &str, millis: i64) -> String {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| "bin".to_string());
    format!("{question_id}/{millis}.{ext}")
}
