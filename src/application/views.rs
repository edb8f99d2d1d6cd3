//! Relational view builder.
//!
//! Read-only projections joining a primary collection against users or
//! videos. Each join is one batched `_id IN (...)` lookup over the secondary
//! collection, never one read per row.

use crate::domain::models::{
    Comment, Like, Playlist, Subscription, Tweet, User, UserSummary, Video,
};
use crate::domain::pagination::Page;
use crate::domain::Id;
use crate::error::{ApiError, ApiResult};
use crate::ports::store::{
    from_document, Collection, Document, DocumentStore, Filter, Projection, Query, SortOrder,
};
use chrono::{DateTime, Utc};
use regex::RegexBuilder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

const USER_SUMMARY: &[&str] = &["username"];
const TWEET_OWNER: &[&str] = &["username", "fullName", "email"];
const HISTORY_OWNER: &[&str] = &["username", "fullName", "avatar"];
const VIDEO_CARD: &[&str] = &[
    "videoFile",
    "title",
    "description",
    "thumbnail",
    "views",
    "isPublished",
    "createdAt",
    "updatedAt",
];
const VIDEO_SUMMARY: &[&str] = &["title", "thumbnail", "createdAt", "views"];
const HISTORY_VIDEO: &[&str] = &[
    "videoFile",
    "thumbnail",
    "title",
    "description",
    "duration",
    "views",
    "owner",
    "createdAt",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscriber: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribedChannelEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoCard {
    #[serde(rename = "_id")]
    pub id: Id,
    pub video_file: String,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikedVideo {
    pub video: VideoCard,
    pub liked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSummary {
    #[serde(rename = "_id")]
    pub id: Id,
    pub title: String,
    pub thumbnail: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub views: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistDetail {
    #[serde(rename = "_id")]
    pub id: Id,
    pub name: String,
    pub description: String,
    pub videos: Vec<VideoSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub total_videos: u64,
    pub total_subscribers: u64,
    pub total_video_views: u64,
    pub total_video_likes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    #[serde(rename = "_id")]
    pub id: Id,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPage {
    pub comments: Vec<CommentView>,
    pub total_comments: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoPage {
    pub videos: Vec<Video>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetWithOwner {
    #[serde(rename = "_id")]
    pub id: Id,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchedVideo {
    #[serde(rename = "_id")]
    pub id: Id,
    pub video_file: String,
    pub thumbnail: String,
    pub title: String,
    pub description: String,
    pub duration: f64,
    #[serde(default)]
    pub views: u64,
    #[serde(skip_serializing)]
    pub owner: Id,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub video: WatchedVideo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserSummary>,
}

/// Fields `list_videos` may sort on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoSort {
    CreatedAt,
    UpdatedAt,
    Views,
    Title,
    Duration,
}

impl VideoSort {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "createdAt" => Some(VideoSort::CreatedAt),
            "updatedAt" => Some(VideoSort::UpdatedAt),
            "views" => Some(VideoSort::Views),
            "title" => Some(VideoSort::Title),
            "duration" => Some(VideoSort::Duration),
            _ => None,
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            VideoSort::CreatedAt => "createdAt",
            VideoSort::UpdatedAt => "updatedAt",
            VideoSort::Views => "views",
            VideoSort::Title => "title",
            VideoSort::Duration => "duration",
        }
    }
}

#[derive(Debug, Clone)]
pub struct VideoListParams {
    pub page: Page,
    /// Title search, matched literally and case-insensitively.
    pub query: Option<String>,
    pub sort_by: VideoSort,
    pub order: SortOrder,
    pub owner: Option<Id>,
}

impl Default for VideoListParams {
    fn default() -> Self {
        Self {
            page: Page::default(),
            query: None,
            sort_by: VideoSort::CreatedAt,
            order: SortOrder::Desc,
            owner: None,
        }
    }
}

fn id_of(doc: &Document) -> Option<Id> {
    doc.get("_id")
        .and_then(|v| v.as_str())
        .and_then(|s| Id::parse(s).ok())
}

fn decode_all<T: DeserializeOwned>(docs: Vec<Document>) -> ApiResult<Vec<T>> {
    docs.into_iter()
        .map(|doc| from_document(doc).map_err(ApiError::from))
        .collect()
}

pub struct ViewBuilder<S> {
    store: S,
}

impl<S: DocumentStore> ViewBuilder<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Batched `_id IN (...)` lookup keyed by id. Ids that match nothing, or
    /// fail `extra`, are simply absent from the map.
    async fn lookup<T: DeserializeOwned>(
        &self,
        collection: Collection,
        ids: impl IntoIterator<Item = Id>,
        fields: &[&str],
        extra: Filter,
    ) -> ApiResult<HashMap<Id, T>> {
        let ids: HashSet<Id> = ids.into_iter().collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let query = Query::new(Filter::any_of("_id", ids).and(extra))
            .project(Projection::include(fields));
        let docs = self.store.find(collection, &query).await?;

        let mut found = HashMap::with_capacity(docs.len());
        for doc in docs {
            if let Some(id) = id_of(&doc) {
                found.insert(id, from_document(doc)?);
            }
        }
        Ok(found)
    }

    pub async fn list_subscribers(&self, channel: Id) -> ApiResult<Vec<SubscriberEntry>> {
        let query = Query::new(Filter::eq("channel", channel)).newest_first();
        let subs: Vec<Subscription> =
            decode_all(self.store.find(Collection::Subscriptions, &query).await?)?;

        let users: HashMap<Id, UserSummary> = self
            .lookup(
                Collection::Users,
                subs.iter().map(|s| s.subscriber),
                USER_SUMMARY,
                Filter::All,
            )
            .await?;

        Ok(subs
            .into_iter()
            .map(|s| SubscriberEntry {
                subscriber: users.get(&s.subscriber).cloned(),
                created_at: s.created_at,
                updated_at: s.updated_at,
            })
            .collect())
    }

    pub async fn list_subscriptions(&self, subscriber: Id) -> ApiResult<Vec<SubscribedChannelEntry>> {
        let query = Query::new(Filter::eq("subscriber", subscriber)).newest_first();
        let subs: Vec<Subscription> =
            decode_all(self.store.find(Collection::Subscriptions, &query).await?)?;

        let users: HashMap<Id, UserSummary> = self
            .lookup(
                Collection::Users,
                subs.iter().map(|s| s.channel),
                USER_SUMMARY,
                Filter::All,
            )
            .await?;

        Ok(subs
            .into_iter()
            .map(|s| SubscribedChannelEntry {
                channel: users.get(&s.channel).cloned(),
                created_at: s.created_at,
                updated_at: s.updated_at,
            })
            .collect())
    }

    /// Videos the actor liked, newest like first. Likes on unpublished or
    /// deleted videos are dropped.
    pub async fn list_liked_videos(&self, actor: Id) -> ApiResult<Vec<LikedVideo>> {
        let query = Query::new(Filter::eq("likedBy", actor).and(Filter::exists("video")))
            .newest_first();
        let likes: Vec<Like> = decode_all(self.store.find(Collection::Likes, &query).await?)?;

        let mut videos: HashMap<Id, VideoCard> = self
            .lookup(
                Collection::Videos,
                likes.iter().filter_map(|l| l.video),
                VIDEO_CARD,
                Filter::eq("isPublished", true),
            )
            .await?;

        Ok(likes
            .into_iter()
            .filter_map(|like| {
                let video = like.video.and_then(|id| videos.remove(&id))?;
                Some(LikedVideo {
                    video,
                    liked_at: like.created_at,
                })
            })
            .collect())
    }

    pub async fn get_playlist_detail(&self, playlist_id: Id) -> ApiResult<PlaylistDetail> {
        let doc = self
            .store
            .find_one(Collection::Playlists, &Filter::id(playlist_id))
            .await?
            .ok_or_else(|| ApiError::not_found("Playlist not found"))?;
        let playlist: Playlist = from_document(doc)?;

        let videos: HashMap<Id, VideoSummary> = self
            .lookup(
                Collection::Videos,
                playlist.videos.iter().copied(),
                VIDEO_SUMMARY,
                Filter::All,
            )
            .await?;
        let owners: HashMap<Id, UserSummary> = self
            .lookup(
                Collection::Users,
                [playlist.owner],
                USER_SUMMARY,
                Filter::All,
            )
            .await?;

        Ok(PlaylistDetail {
            id: playlist.id,
            name: playlist.name,
            description: playlist.description,
            videos: playlist
                .videos
                .iter()
                .filter_map(|id| videos.get(id).cloned())
                .collect(),
            owner: owners.get(&playlist.owner).cloned(),
            created_at: playlist.created_at,
            updated_at: playlist.updated_at,
        })
    }

    pub async fn get_channel_stats(&self, owner: Id) -> ApiResult<ChannelStats> {
        let query = Query::new(Filter::eq("owner", owner)).project(Projection::include(&["views"]));
        let videos = self.store.find(Collection::Videos, &query).await?;

        let total_video_views: u64 = videos
            .iter()
            .filter_map(|v| v.get("views").and_then(|n| n.as_u64()))
            .sum();
        let video_ids: Vec<Id> = videos.iter().filter_map(id_of).collect();

        let total_subscribers = self
            .store
            .count(Collection::Subscriptions, &Filter::eq("channel", owner))
            .await?;
        let total_video_likes = if video_ids.is_empty() {
            0
        } else {
            self.store
                .count(Collection::Likes, &Filter::any_of("video", video_ids))
                .await?
        };

        Ok(ChannelStats {
            total_videos: videos.len() as u64,
            total_subscribers,
            total_video_views,
            total_video_likes,
        })
    }

    pub async fn list_video_comments(&self, video: Id, page: Page) -> ApiResult<CommentPage> {
        let filter = Filter::eq("video", video);
        let query = Query::new(filter.clone())
            .newest_first()
            .skip(page.offset())
            .limit(page.limit);
        let comments: Vec<Comment> =
            decode_all(self.store.find(Collection::Comments, &query).await?)?;
        let total_comments = self.store.count(Collection::Comments, &filter).await?;

        let owners: HashMap<Id, UserSummary> = self
            .lookup(
                Collection::Users,
                comments.iter().map(|c| c.owner),
                USER_SUMMARY,
                Filter::All,
            )
            .await?;

        Ok(CommentPage {
            comments: comments
                .into_iter()
                .map(|c| CommentView {
                    id: c.id,
                    content: c.content,
                    owner: owners.get(&c.owner).cloned(),
                    created_at: c.created_at,
                    updated_at: c.updated_at,
                })
                .collect(),
            total_comments,
        })
    }

    /// Published videos. An empty page is an empty list, not an error.
    pub async fn list_videos(&self, params: &VideoListParams) -> ApiResult<VideoPage> {
        let mut filter = Filter::eq("isPublished", true);
        if let Some(q) = params.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let re = RegexBuilder::new(&regex::escape(q))
                .case_insensitive(true)
                .build()
                .map_err(|e| ApiError::invalid(format!("Invalid query: {}", e)))?;
            filter = filter.and(Filter::Matches("title".to_string(), re));
        }
        if let Some(owner) = params.owner {
            filter = filter.and(Filter::eq("owner", owner));
        }

        let query = Query::new(filter.clone())
            .sort(params.sort_by.field(), params.order)
            .skip(params.page.offset())
            .limit(params.page.limit);
        let videos: Vec<Video> = decode_all(self.store.find(Collection::Videos, &query).await?)?;
        let total = self.store.count(Collection::Videos, &filter).await?;

        Ok(VideoPage { videos, total })
    }

    /// All of the owner's videos, published or not, without the owner field.
    pub async fn list_channel_videos(&self, owner: Id) -> ApiResult<Vec<Document>> {
        let query = Query::new(Filter::eq("owner", owner))
            .newest_first()
            .project(Projection::exclude(&["owner"]));
        Ok(self.store.find(Collection::Videos, &query).await?)
    }

    pub async fn list_user_tweets(&self, user: Id) -> ApiResult<Vec<Document>> {
        let query = Query::new(Filter::eq("owner", user))
            .newest_first()
            .project(Projection::exclude(&["owner"]));
        Ok(self.store.find(Collection::Tweets, &query).await?)
    }

    pub async fn list_user_playlists(&self, user: Id) -> ApiResult<Vec<Playlist>> {
        let query = Query::new(Filter::eq("owner", user)).newest_first();
        decode_all(self.store.find(Collection::Playlists, &query).await?)
    }

    pub async fn tweet_with_owner(&self, tweet: Tweet) -> ApiResult<TweetWithOwner> {
        let owners: HashMap<Id, UserSummary> = self
            .lookup(Collection::Users, [tweet.owner], TWEET_OWNER, Filter::All)
            .await?;

        Ok(TweetWithOwner {
            id: tweet.id,
            content: tweet.content,
            owner: owners.get(&tweet.owner).cloned(),
            created_at: tweet.created_at,
            updated_at: tweet.updated_at,
        })
    }

    /// The user's watch history in the order it was recorded, each video
    /// carrying its owner's public profile.
    pub async fn watch_history(&self, user: &User) -> ApiResult<Vec<HistoryEntry>> {
        let videos: HashMap<Id, WatchedVideo> = self
            .lookup(
                Collection::Videos,
                user.watch_history.iter().copied(),
                HISTORY_VIDEO,
                Filter::All,
            )
            .await?;
        let owners: HashMap<Id, UserSummary> = self
            .lookup(
                Collection::Users,
                videos.values().map(|v| v.owner),
                HISTORY_OWNER,
                Filter::All,
            )
            .await?;

        Ok(user
            .watch_history
            .iter()
            .filter_map(|id| videos.get(id))
            .map(|video| HistoryEntry {
                owner: owners.get(&video.owner).cloned(),
                video: video.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fixtures;
    use crate::domain::models::LikeTarget;
    use crate::ports::store::{to_document, Update};

    #[tokio::test]
    async fn test_subscribers_newest_first_with_public_fields_only() {
        let store = fixtures::store();
        let channel = fixtures::user(&store, "channel").await;
        let first = fixtures::user(&store, "first").await;
        let second = fixtures::user(&store, "second").await;
        fixtures::subscribe(&store, first.id, channel.id).await;
        fixtures::subscribe(&store, second.id, channel.id).await;

        let views = ViewBuilder::new(store.clone());
        let subs = views.list_subscribers(channel.id).await.unwrap();
        let names: Vec<&str> = subs
            .iter()
            .map(|s| s.subscriber.as_ref().unwrap().username.as_str())
            .collect();
        assert_eq!(names, vec!["second", "first"]);

        let json = serde_json::to_value(&subs[0]).unwrap();
        assert!(json.get("_id").is_none());
        assert!(json.get("channel").is_none());
        assert!(json["subscriber"].get("email").is_none());
        assert_eq!(json["subscriber"]["_id"], second.id.to_string());

        let channels = views.list_subscriptions(first.id).await.unwrap();
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].channel.as_ref().unwrap().id, channel.id);
    }

    #[tokio::test]
    async fn test_liked_videos_excludes_unpublished() {
        let store = fixtures::store();
        let owner = fixtures::user(&store, "owner").await;
        let fan = fixtures::user(&store, "fan").await;
        let public = fixtures::video(&store, owner.id, true).await;
        let draft = fixtures::video(&store, owner.id, false).await;
        let tweet = fixtures::tweet(&store, owner.id, "hi").await;

        fixtures::like(&store, fan.id, LikeTarget::Video(public.id)).await;
        fixtures::like(&store, fan.id, LikeTarget::Video(draft.id)).await;
        fixtures::like(&store, fan.id, LikeTarget::Tweet(tweet.id)).await;

        let liked = ViewBuilder::new(store.clone())
            .list_liked_videos(fan.id)
            .await
            .unwrap();
        assert_eq!(liked.len(), 1);
        assert_eq!(liked[0].video.id, public.id);
        assert!(liked[0].video.is_published);

        let json = serde_json::to_value(&liked[0]).unwrap();
        assert!(json["video"].get("owner").is_none());
        assert!(json.get("likedBy").is_none());
    }

    #[tokio::test]
    async fn test_playlist_detail_flattens_owner_and_keeps_order() {
        let store = fixtures::store();
        let owner = fixtures::user(&store, "owner").await;
        let a = fixtures::video(&store, owner.id, true).await;
        let b = fixtures::video(&store, owner.id, false).await;
        let playlist = fixtures::playlist(&store, owner.id, "mix").await;
        for id in [b.id, a.id, Id::new()] {
            store
                .update_one(
                    Collection::Playlists,
                    &Filter::id(playlist.id),
                    &Update::new().add_to_set("videos", id),
                )
                .await
                .unwrap();
        }

        let views = ViewBuilder::new(store.clone());
        let detail = views.get_playlist_detail(playlist.id).await.unwrap();
        let ids: Vec<Id> = detail.videos.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);
        assert_eq!(detail.owner.as_ref().unwrap().username, "owner");

        let err = views.get_playlist_detail(Id::new()).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_channel_stats() {
        let store = fixtures::store();
        let owner = fixtures::user(&store, "owner").await;
        let other = fixtures::user(&store, "other").await;
        let fan = fixtures::user(&store, "fan").await;
        let v1 = fixtures::video(&store, owner.id, true).await;
        let v2 = fixtures::video(&store, owner.id, false).await;
        let foreign = fixtures::video(&store, other.id, true).await;

        for (id, views) in [(v1.id, 5), (v2.id, 7), (foreign.id, 100)] {
            store
                .update_one(
                    Collection::Videos,
                    &Filter::id(id),
                    &Update::new().inc("views", views),
                )
                .await
                .unwrap();
        }
        fixtures::subscribe(&store, fan.id, owner.id).await;
        fixtures::subscribe(&store, other.id, owner.id).await;
        fixtures::like(&store, fan.id, LikeTarget::Video(v1.id)).await;
        fixtures::like(&store, other.id, LikeTarget::Video(v2.id)).await;
        fixtures::like(&store, fan.id, LikeTarget::Video(foreign.id)).await;

        let stats = ViewBuilder::new(store.clone())
            .get_channel_stats(owner.id)
            .await
            .unwrap();
        assert_eq!(
            stats,
            ChannelStats {
                total_videos: 2,
                total_subscribers: 2,
                total_video_views: 12,
                total_video_likes: 2,
            }
        );

        let empty = ViewBuilder::new(store.clone())
            .get_channel_stats(fan.id)
            .await
            .unwrap();
        assert_eq!(empty.total_video_likes, 0);
    }

    #[tokio::test]
    async fn test_comment_pagination_reports_unpaged_total() {
        let store = fixtures::store();
        let owner = fixtures::user(&store, "owner").await;
        let video = fixtures::video(&store, owner.id, true).await;
        for i in 0..25 {
            fixtures::comment(&store, owner.id, video.id, &format!("comment {}", i)).await;
        }

        let views = ViewBuilder::new(store.clone());
        let page = views
            .list_video_comments(video.id, Page::new(2, 10).unwrap())
            .await
            .unwrap();
        assert_eq!(page.total_comments, 25);
        assert_eq!(page.comments.len(), 10);
        // newest first: page two starts at the 11th newest comment
        assert_eq!(page.comments[0].content, "comment 14");
        assert_eq!(page.comments[0].owner.as_ref().unwrap().id, owner.id);

        let last = views
            .list_video_comments(video.id, Page::new(3, 10).unwrap())
            .await
            .unwrap();
        assert_eq!(last.comments.len(), 5);
        assert_eq!(last.total_comments, 25);
    }

    #[tokio::test]
    async fn test_list_videos_filters_and_pages() {
        let store = fixtures::store();
        let alice = fixtures::user(&store, "alice").await;
        let bob = fixtures::user(&store, "bob").await;
        for i in 0..12 {
            let mut video = fixtures::video_draft(alice.id, true);
            video.title = format!("Rust (part {})", i);
            store
                .insert(Collection::Videos, to_document(&video).unwrap())
                .await
                .unwrap();
        }
        fixtures::video(&store, bob.id, true).await;
        fixtures::video(&store, alice.id, false).await;

        let views = ViewBuilder::new(store.clone());

        let all = views.list_videos(&VideoListParams::default()).await.unwrap();
        assert_eq!(all.total, 13);
        assert_eq!(all.videos.len(), 10);

        let params = VideoListParams {
            page: Page::new(2, 10).unwrap(),
            query: Some("rust (PART".to_string()),
            ..Default::default()
        };
        let searched = views.list_videos(&params).await.unwrap();
        assert_eq!(searched.total, 12);
        assert_eq!(searched.videos.len(), 2);

        let params = VideoListParams {
            owner: Some(bob.id),
            ..Default::default()
        };
        let bobs = views.list_videos(&params).await.unwrap();
        assert_eq!(bobs.total, 1);

        let params = VideoListParams {
            owner: Some(Id::new()),
            ..Default::default()
        };
        let none = views.list_videos(&params).await.unwrap();
        assert_eq!(none.total, 0);
        assert!(none.videos.is_empty());
    }

    #[tokio::test]
    async fn test_channel_videos_and_tweets_strip_owner() {
        let store = fixtures::store();
        let alice = fixtures::user(&store, "alice").await;
        fixtures::video(&store, alice.id, false).await;
        fixtures::tweet(&store, alice.id, "one").await;
        fixtures::tweet(&store, alice.id, "two").await;

        let views = ViewBuilder::new(store.clone());
        let videos = views.list_channel_videos(alice.id).await.unwrap();
        assert_eq!(videos.len(), 1);
        assert!(videos[0].get("owner").is_none());

        let tweets = views.list_user_tweets(alice.id).await.unwrap();
        assert_eq!(tweets[0]["content"], "two");
        assert!(tweets[0].get("owner").is_none());
    }

    #[tokio::test]
    async fn test_watch_history_resolves_owner() {
        let store = fixtures::store();
        let owner = fixtures::user(&store, "owner").await;
        let viewer = fixtures::user(&store, "viewer").await;
        let video = fixtures::video(&store, owner.id, true).await;

        let mut viewer = viewer;
        viewer.watch_history = vec![video.id, Id::new()];

        let history = ViewBuilder::new(store.clone())
            .watch_history(&viewer)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].video.id, video.id);
        assert_eq!(history[0].owner.as_ref().unwrap().username, "owner");

        let json = serde_json::to_value(&history[0]).unwrap();
        assert_eq!(json["owner"]["username"], "owner");
        assert_eq!(json["_id"], video.id.to_string());
    }
}
