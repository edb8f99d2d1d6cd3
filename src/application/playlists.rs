use super::guard::OwnerContext;
use super::is_blank;
use super::views::{PlaylistDetail, ViewBuilder};
use crate::domain::models::Playlist;
use crate::domain::Id;
use crate::error::{ApiError, ApiResult};
use crate::ports::store::{from_document, to_document, Collection, DocumentStore, Filter, Update};

pub struct PlaylistService<S> {
    store: S,
}

impl<S> PlaylistService<S>
where
    S: DocumentStore + Clone,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn views(&self) -> ViewBuilder<S> {
        ViewBuilder::new(self.store.clone())
    }

    async fn apply(&self, playlist: Id, update: Update) -> ApiResult<Playlist> {
        let doc = self
            .store
            .update_one(Collection::Playlists, &Filter::id(playlist), &update)
            .await?
            .ok_or_else(|| ApiError::not_found("Playlist not found"))?;
        Ok(from_document(doc)?)
    }

    pub async fn create(&self, owner: Id, name: &str, description: Option<&str>) -> ApiResult<Playlist> {
        if is_blank(name) {
            return Err(ApiError::invalid("Name is required"));
        }
        let description = description.map(str::trim).unwrap_or_default();
        let playlist = Playlist::new(owner, name.trim(), description);
        self.store
            .insert(Collection::Playlists, to_document(&playlist)?)
            .await
            .map_err(|e| ApiError::internal_from("Failed to create playlist", e))?;
        Ok(playlist)
    }

    pub async fn detail(&self, playlist: Id) -> ApiResult<PlaylistDetail> {
        self.views().get_playlist_detail(playlist).await
    }

    pub async fn user_playlists(&self, user: Id) -> ApiResult<Vec<Playlist>> {
        self.views().list_user_playlists(user).await
    }

    pub async fn update(&self, ctx: OwnerContext<Playlist>, name: &str, description: &str) -> ApiResult<Playlist> {
        if is_blank(name) || is_blank(description) {
            return Err(ApiError::invalid("Name and description are required"));
        }
        let update = Update::new()
            .set("name", name.trim())
            .set("description", description.trim());
        self.apply(ctx.resource.id, update).await
    }

    pub async fn delete(&self, ctx: OwnerContext<Playlist>) -> ApiResult<()> {
        self.store
            .delete_one(Collection::Playlists, &Filter::id(ctx.resource.id))
            .await?
            .ok_or_else(|| ApiError::not_found("Playlist not found"))?;
        Ok(())
    }

    /// Adding a video twice leaves one entry.
    pub async fn add_video(&self, ctx: OwnerContext<Playlist>, video: Id) -> ApiResult<Playlist> {
        if self.store.count(Collection::Videos, &Filter::id(video)).await? == 0 {
            return Err(ApiError::not_found("Video not found"));
        }
        self.apply(ctx.resource.id, Update::new().add_to_set("videos", video))
            .await
    }

    pub async fn remove_video(&self, ctx: OwnerContext<Playlist>, video: Id) -> ApiResult<Playlist> {
        self.apply(ctx.resource.id, Update::new().pull("videos", video))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fixtures;

    #[tokio::test]
    async fn test_videos_have_set_semantics() {
        let store = fixtures::store();
        let alice = fixtures::user(&store, "alice").await;
        let video = fixtures::video(&store, alice.id, true).await;
        let playlists = PlaylistService::new(store.clone());

        let playlist = playlists.create(alice.id, "Favourites", None).await.unwrap();
        assert_eq!(playlist.description, "");
        let ctx = || OwnerContext {
            principal: alice.clone(),
            resource: playlist.clone(),
        };

        playlists.add_video(ctx(), video.id).await.unwrap();
        let twice = playlists.add_video(ctx(), video.id).await.unwrap();
        assert_eq!(twice.videos, vec![video.id]);

        let err = playlists.add_video(ctx(), Id::new()).await.unwrap_err();
        assert_eq!(err.status_code(), 404);

        let removed = playlists.remove_video(ctx(), video.id).await.unwrap();
        assert!(removed.videos.is_empty());
        // removing an absent video is a no-op
        let again = playlists.remove_video(ctx(), video.id).await.unwrap();
        assert!(again.videos.is_empty());
    }

    #[tokio::test]
    async fn test_create_update_delete() {
        let store = fixtures::store();
        let alice = fixtures::user(&store, "alice").await;
        let playlists = PlaylistService::new(store.clone());

        assert_eq!(
            playlists.create(alice.id, " ", None).await.unwrap_err().status_code(),
            400
        );
        let playlist = playlists
            .create(alice.id, "Mix", Some("evening"))
            .await
            .unwrap();
        let ctx = || OwnerContext {
            principal: alice.clone(),
            resource: playlist.clone(),
        };

        assert!(playlists.update(ctx(), "Mix", "").await.is_err());
        let updated = playlists.update(ctx(), "Night mix", "late").await.unwrap();
        assert_eq!(updated.name, "Night mix");
        assert_eq!(playlists.user_playlists(alice.id).await.unwrap().len(), 1);

        playlists.delete(ctx()).await.unwrap();
        assert_eq!(playlists.detail(playlist.id).await.unwrap_err().status_code(), 404);
    }
}
