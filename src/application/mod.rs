//! Application layer - generic services over the store and media ports.

pub mod comments;
pub mod dashboard;
pub mod guard;
pub mod likes;
pub mod playlists;
pub mod subscriptions;
pub mod toggle;
pub mod tweets;
pub mod users;
pub mod videos;
pub mod views;

/// Rejects empty or whitespace-only input.
pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::adapters::memory::MemoryStore;
    use crate::domain::models::{
        Comment, Like, LikeTarget, Playlist, Subscription, Tweet, User, Video,
    };
    use crate::domain::Id;
    use crate::ports::store::{to_document, Collection, DocumentStore};
    use chrono::Utc;
    use serde::Serialize;

    pub fn store() -> MemoryStore {
        MemoryStore::new()
    }

    async fn put<T: Serialize>(store: &MemoryStore, collection: Collection, value: &T) {
        store
            .insert(collection, to_document(value).unwrap())
            .await
            .unwrap();
    }

    pub async fn user(store: &MemoryStore, name: &str) -> User {
        let user = User::new(name, &format!("{}@example.com", name), name);
        put(store, Collection::Users, &user).await;
        user
    }

    pub fn video_draft(owner: Id, published: bool) -> Video {
        let id = Id::new();
        let now = Utc::now();
        Video {
            id,
            video_file: format!("http://media.test/{}.mp4", id),
            video_file_public_id: format!("{}.mp4", id),
            thumbnail: format!("http://media.test/{}.png", id),
            thumbnail_public_id: format!("{}.png", id),
            title: format!("video {}", id),
            description: "a video".to_string(),
            duration: 12.5,
            views: 0,
            is_published: published,
            owner,
            created_at: now,
            updated_at: now,
        }
    }

    pub async fn video(store: &MemoryStore, owner: Id, published: bool) -> Video {
        let video = video_draft(owner, published);
        put(store, Collection::Videos, &video).await;
        video
    }

    pub async fn tweet(store: &MemoryStore, owner: Id, content: &str) -> Tweet {
        let tweet = Tweet::new(owner, content);
        put(store, Collection::Tweets, &tweet).await;
        tweet
    }

    pub async fn comment(store: &MemoryStore, owner: Id, video: Id, content: &str) -> Comment {
        let comment = Comment::new(owner, video, content);
        put(store, Collection::Comments, &comment).await;
        comment
    }

    pub async fn playlist(store: &MemoryStore, owner: Id, name: &str) -> Playlist {
        let playlist = Playlist::new(owner, name, "");
        put(store, Collection::Playlists, &playlist).await;
        playlist
    }

    pub async fn subscribe(store: &MemoryStore, subscriber: Id, channel: Id) -> Subscription {
        let sub = Subscription::new(subscriber, channel);
        put(store, Collection::Subscriptions, &sub).await;
        sub
    }

    pub async fn like(store: &MemoryStore, liker: Id, target: LikeTarget) -> Like {
        let like = Like::new(liker, target);
        put(store, Collection::Likes, &like).await;
        like
    }
}
