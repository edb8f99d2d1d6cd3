use crate::domain::Id;
use crate::ports::media::{MediaError, MediaStorage, UploadedMedia};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

/// Media storage backed by a local directory that is served under
/// `base_url` (the monolith mounts it at `/media`).
#[derive(Clone, Debug)]
pub struct FsMediaStorage {
    media_dir: PathBuf,
    base_url: String,
}

impl FsMediaStorage {
    pub fn new(media_dir: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            media_dir: media_dir.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn object_path(&self, public_id: &str) -> Option<PathBuf> {
        let path = Path::new(public_id);
        let single_normal = path.components().count() == 1
            && matches!(path.components().next(), Some(Component::Normal(_)));
        single_normal.then(|| self.media_dir.join(path))
    }
}

#[async_trait]
impl MediaStorage for FsMediaStorage {
    async fn upload(&self, local_path: &Path) -> Result<UploadedMedia, MediaError> {
        let public_id = match local_path.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{}.{}", Id::new(), ext.to_lowercase()),
            None => Id::new().to_string(),
        };
        let dest = self.media_dir.join(&public_id);

        tokio::fs::create_dir_all(&self.media_dir).await?;
        tokio::fs::copy(local_path, &dest)
            .await
            .map_err(|e| MediaError::Upload(format!("{}: {}", local_path.display(), e)))?;

        tracing::debug!(public_id = %public_id, "stored media object");
        Ok(UploadedMedia {
            url: format!("{}/{}", self.base_url, public_id),
            public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<(), MediaError> {
        let path = self.object_path(public_id).ok_or_else(|| MediaError::Delete {
            public_id: public_id.to_string(),
            reason: "invalid object id".to_string(),
        })?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MediaError::Delete {
                public_id: public_id.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}
