use crate::domain::Id;
use crate::ports::media::{MediaError, MediaStorage, UploadedMedia};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::path::Path;

/// S3MediaStorage implements MediaStorage for AWS S3.
#[derive(Clone)]
pub struct S3MediaStorage {
    client: Client,
    bucket: String,
    /// Public base URL objects are served from (bucket website or CDN)
    public_url: String,
}

impl S3MediaStorage {
    pub fn new(client: Client, bucket: String, public_url: String) -> Self {
        Self {
            client,
            bucket,
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }
}

fn object_key(local_path: &Path) -> String {
    match local_path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("media/{}.{}", Id::new(), ext.to_lowercase()),
        None => format!("media/{}", Id::new()),
    }
}

#[async_trait]
impl MediaStorage for S3MediaStorage {
    async fn upload(&self, local_path: &Path) -> Result<UploadedMedia, MediaError> {
        let key = object_key(local_path);
        let content_type = mime_guess::from_path(local_path)
            .first_or_octet_stream()
            .to_string();

        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| MediaError::Upload(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| MediaError::Upload(e.to_string()))?;

        tracing::debug!(bucket = %self.bucket, key = %key, "uploaded media object");
        Ok(UploadedMedia {
            url: format!("{}/{}", self.public_url, key),
            public_id: key,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<(), MediaError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(public_id)
            .send()
            .await
            .map_err(|e| MediaError::Delete {
                public_id: public_id.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }
}
