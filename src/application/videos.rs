//! Video publication workflow.
//!
//! Publishing spans the media storage and the document store without a
//! transaction between them. Every failure after an upload deletes the remote
//! objects it already created, and local temp files are always removed once
//! uploads were attempted.

use super::guard::OwnerContext;
use super::is_blank;
use super::views::{VideoListParams, VideoPage, ViewBuilder};
use crate::domain::models::Video;
use crate::domain::Id;
use crate::error::{ApiError, ApiResult};
use crate::ports::media::{MediaStorage, UploadedMedia};
use crate::ports::store::{
    from_document, to_document, Collection, DocumentStore, Filter, StoreError, Update,
};
use chrono::Utc;
use std::path::{Path, PathBuf};

/// Local temp files received with a publish request.
#[derive(Debug, Clone, Default)]
pub struct PublishMedia {
    pub video_file: Option<PathBuf>,
    pub thumbnail: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub duration: String,
}

#[derive(Debug, Clone, Default)]
pub struct VideoChanges {
    pub title: String,
    pub description: String,
    pub thumbnail: Option<PathBuf>,
}

/// Remove local temp files. Missing files are fine.
pub async fn purge_local(paths: &[&Path]) {
    for path in paths {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove local upload")
            }
        }
    }
}

fn parse_duration(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
}

pub struct VideoService<S, M> {
    store: S,
    media: M,
}

impl<S, M> VideoService<S, M>
where
    S: DocumentStore + Clone,
    M: MediaStorage,
{
    pub fn new(store: S, media: M) -> Self {
        Self { store, media }
    }

    /// Best-effort removal of remote objects. Failures are logged only.
    async fn discard_remote(&self, public_ids: &[&str]) {
        for public_id in public_ids {
            if let Err(e) = self.media.delete(public_id).await {
                tracing::warn!(public_id = %public_id, error = %e, "failed to delete remote media");
            }
        }
    }

    async fn upload_pair(&self, video: &Path, thumbnail: &Path) -> ApiResult<(UploadedMedia, UploadedMedia)> {
        let video_file = self
            .media
            .upload(video)
            .await
            .map_err(|e| ApiError::internal_from("Failed to upload video", e))?;

        match self.media.upload(thumbnail).await {
            Ok(thumbnail) => Ok((video_file, thumbnail)),
            Err(e) => {
                self.discard_remote(&[video_file.public_id.as_str()]).await;
                Err(ApiError::internal_from("Failed to upload thumbnail", e))
            }
        }
    }

    pub async fn list(&self, params: &VideoListParams) -> ApiResult<VideoPage> {
        ViewBuilder::new(self.store.clone()).list_videos(params).await
    }

    pub async fn publish(&self, owner: Id, media: PublishMedia, meta: VideoMetadata) -> ApiResult<Video> {
        let (video_path, thumbnail_path) = match (media.video_file, media.thumbnail) {
            (Some(video), Some(thumbnail)) => (video, thumbnail),
            (video, thumbnail) => {
                let received: Vec<&Path> = video
                    .iter()
                    .chain(thumbnail.iter())
                    .map(PathBuf::as_path)
                    .collect();
                purge_local(&received).await;
                return Err(ApiError::invalid("Video file and thumbnail are required"));
            }
        };
        let local = [video_path.as_path(), thumbnail_path.as_path()];

        if [&meta.title, &meta.description, &meta.duration]
            .iter()
            .any(|field| is_blank(field))
        {
            purge_local(&local).await;
            return Err(ApiError::invalid("All fields are required"));
        }
        let Some(duration) = parse_duration(&meta.duration) else {
            purge_local(&local).await;
            return Err(ApiError::invalid("Duration must be a non-negative number"));
        };

        let uploaded = self.upload_pair(&video_path, &thumbnail_path).await;
        purge_local(&local).await;
        let (video_file, thumbnail) = uploaded?;

        let now = Utc::now();
        let video = Video {
            id: Id::new(),
            video_file: video_file.url,
            video_file_public_id: video_file.public_id,
            thumbnail: thumbnail.url,
            thumbnail_public_id: thumbnail.public_id,
            title: meta.title.trim().to_string(),
            description: meta.description.trim().to_string(),
            duration,
            views: 0,
            is_published: false,
            owner,
            created_at: now,
            updated_at: now,
        };

        let inserted = match to_document(&video) {
            Ok(doc) => self.store.insert(Collection::Videos, doc).await,
            Err(e) => Err(e),
        };
        if let Err(e) = inserted {
            self.discard_remote(&[
                video.video_file_public_id.as_str(),
                video.thumbnail_public_id.as_str(),
            ])
            .await;
            return Err(ApiError::internal_from("Failed to create video", e));
        }

        tracing::info!(video = %video.id, owner = %owner, "video published");
        Ok(video)
    }

    /// Counts a view and records the video in the viewer's history.
    pub async fn get_by_id(&self, viewer: Id, video_id: Id) -> ApiResult<Video> {
        let doc = self
            .store
            .update_one(
                Collection::Videos,
                &Filter::id(video_id),
                &Update::new().inc("views", 1),
            )
            .await?
            .ok_or_else(|| ApiError::not_found("Video not found"))?;

        self.store
            .update_one(
                Collection::Users,
                &Filter::id(viewer),
                &Update::new().add_to_set("watchHistory", video_id),
            )
            .await?;

        Ok(from_document(doc)?)
    }

    pub async fn update(&self, ctx: OwnerContext<Video>, changes: VideoChanges) -> ApiResult<Video> {
        let Some(thumbnail_path) = changes.thumbnail else {
            return Err(ApiError::invalid("Thumbnail is required"));
        };
        if is_blank(&changes.title) || is_blank(&changes.description) {
            purge_local(&[thumbnail_path.as_path()]).await;
            return Err(ApiError::invalid("Title and description are required"));
        }

        let uploaded = self.media.upload(&thumbnail_path).await;
        purge_local(&[thumbnail_path.as_path()]).await;
        let thumbnail = uploaded.map_err(|e| ApiError::internal_from("Failed to upload thumbnail", e))?;

        let update = Update::new()
            .set("title", changes.title.trim())
            .set("description", changes.description.trim())
            .set("thumbnail", thumbnail.url.as_str())
            .set("thumbnailPublicId", thumbnail.public_id.as_str());
        let updated = match self
            .store
            .update_one(Collection::Videos, &Filter::id(ctx.resource.id), &update)
            .await
        {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                self.discard_remote(&[thumbnail.public_id.as_str()]).await;
                return Err(ApiError::not_found("Video not found"));
            }
            Err(e) => {
                self.discard_remote(&[thumbnail.public_id.as_str()]).await;
                return Err(ApiError::internal_from("Failed to update video", e));
            }
        };

        self.discard_remote(&[ctx.resource.thumbnail_public_id.as_str()]).await;
        Ok(from_document(updated)?)
    }

    pub async fn delete(&self, ctx: OwnerContext<Video>) -> ApiResult<()> {
        let video = ctx.resource;
        self.store
            .delete_one(Collection::Videos, &Filter::id(video.id))
            .await?
            .ok_or_else(|| ApiError::not_found("Video not found"))?;

        self.discard_remote(&[
            video.video_file_public_id.as_str(),
            video.thumbnail_public_id.as_str(),
        ])
        .await;
        tracing::info!(video = %video.id, "video deleted");
        Ok(())
    }

    /// Flips `isPublished` only if it still holds the value the guard read.
    pub async fn toggle_publish(&self, ctx: OwnerContext<Video>) -> ApiResult<Video> {
        let video = ctx.resource;
        let filter = Filter::id(video.id).and(Filter::eq("isPublished", video.is_published));
        let update = Update::new().set("isPublished", !video.is_published);

        match self.store.update_one(Collection::Videos, &filter, &update).await? {
            Some(doc) => Ok(from_document(doc)?),
            None if self.store.count(Collection::Videos, &Filter::id(video.id)).await? == 0 => {
                Err(ApiError::not_found("Video not found"))
            }
            None => {
                tracing::warn!(video = %video.id, "publish state changed concurrently");
                Err(StoreError::Conflict(Collection::Videos).into())
            }
        }
    }
}
