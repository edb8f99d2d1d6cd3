use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Reference to an object held by the media storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedMedia {
    pub url: String,
    pub public_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Delete failed for {public_id}: {reason}")]
    Delete { public_id: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Upload a file from a local path. The local file is left in place.
    async fn upload(&self, local_path: &Path) -> Result<UploadedMedia, MediaError>;

    /// Delete a previously uploaded object
    async fn delete(&self, public_id: &str) -> Result<(), MediaError>;
}

#[async_trait]
impl<T: MediaStorage + ?Sized> MediaStorage for Arc<T> {
    async fn upload(&self, local_path: &Path) -> Result<UploadedMedia, MediaError> {
        (**self).upload(local_path).await
    }

    async fn delete(&self, public_id: &str) -> Result<(), MediaError> {
        (**self).delete(public_id).await
    }
}
