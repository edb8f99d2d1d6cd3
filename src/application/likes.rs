use super::toggle::{toggle, Toggled};
use super::views::{LikedVideo, ViewBuilder};
use crate::domain::models::{Like, LikeTarget};
use crate::domain::Id;
use crate::error::{ApiError, ApiResult};
use crate::ports::store::{Collection, DocumentStore, Filter};

pub struct LikeService<S> {
    store: S,
}

impl<S> LikeService<S>
where
    S: DocumentStore + Clone,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Like or unlike `target` on behalf of `actor`. The target must exist.
    pub async fn toggle_like(&self, actor: Id, target: LikeTarget) -> ApiResult<Toggled<Like>> {
        let (collection, label) = match target {
            LikeTarget::Video(_) => (Collection::Videos, "Video"),
            LikeTarget::Comment(_) => (Collection::Comments, "Comment"),
            LikeTarget::Tweet(_) => (Collection::Tweets, "Tweet"),
        };
        if self.store.count(collection, &Filter::id(target.id())).await? == 0 {
            return Err(ApiError::not_found(format!("{} not found", label)));
        }

        let pair = Filter::eq("likedBy", actor).and(Filter::eq(target.field(), target.id()));
        let toggled = toggle(&self.store, Collection::Likes, Like::new(actor, target), pair).await?;
        tracing::info!(
            actor = %actor,
            target = target.field(),
            id = %target.id(),
            liked = toggled.is_added(),
            "like toggled"
        );
        Ok(toggled)
    }

    pub async fn liked_videos(&self, actor: Id) -> ApiResult<Vec<LikedVideo>> {
        ViewBuilder::new(self.store.clone())
            .list_liked_videos(actor)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fixtures;

    #[tokio::test]
    async fn test_like_then_unlike_video() {
        let store = fixtures::store();
        let owner = fixtures::user(&store, "owner").await;
        let fan = fixtures::user(&store, "fan").await;
        let video = fixtures::video(&store, owner.id, true).await;
        let likes = LikeService::new(store.clone());

        let added = likes
            .toggle_like(fan.id, LikeTarget::Video(video.id))
            .await
            .unwrap();
        match added {
            Toggled::Added(like) => {
                assert_eq!(like.liked_by, fan.id);
                assert_eq!(like.video, Some(video.id));
            }
            Toggled::Removed => panic!("expected a new like"),
        }
        assert_eq!(likes.liked_videos(fan.id).await.unwrap().len(), 1);

        let removed = likes
            .toggle_like(fan.id, LikeTarget::Video(video.id))
            .await
            .unwrap();
        assert_eq!(removed, Toggled::Removed);
        assert!(likes.liked_videos(fan.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_likes_on_different_targets_are_independent() {
        let store = fixtures::store();
        let owner = fixtures::user(&store, "owner").await;
        let video = fixtures::video(&store, owner.id, true).await;
        let comment = fixtures::comment(&store, owner.id, video.id, "nice").await;
        let tweet = fixtures::tweet(&store, owner.id, "hello").await;
        let likes = LikeService::new(store.clone());

        for target in [
            LikeTarget::Video(video.id),
            LikeTarget::Comment(comment.id),
            LikeTarget::Tweet(tweet.id),
        ] {
            assert!(likes.toggle_like(owner.id, target).await.unwrap().is_added());
        }
        let total = store
            .count(Collection::Likes, &Filter::eq("likedBy", owner.id))
            .await
            .unwrap();
        assert_eq!(total, 3);
    }

    #[tokio::test]
    async fn test_missing_target_is_not_found() {
        let store = fixtures::store();
        let fan = fixtures::user(&store, "fan").await;
        let likes = LikeService::new(store.clone());

        let err = likes
            .toggle_like(fan.id, LikeTarget::Tweet(Id::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "Tweet not found"));
        assert_eq!(store.count(Collection::Likes, &Filter::All).await.unwrap(), 0);
    }
}
