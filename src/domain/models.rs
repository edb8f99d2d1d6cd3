use super::id::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user. Credential fields written by the identity service are
/// never read into this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Id,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub watch_history: Vec<Id>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: &str, email: &str, full_name: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Id::new(),
            username: username.to_lowercase(),
            email: email.to_lowercase(),
            full_name: full_name.to_string(),
            avatar: None,
            cover_image: None,
            watch_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Public projection of a user embedded in joined views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: Id,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    #[serde(rename = "_id")]
    pub id: Id,
    pub video_file: String,
    pub video_file_public_id: String,
    pub thumbnail: String,
    pub thumbnail_public_id: String,
    pub title: String,
    pub description: String,
    pub duration: f64,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub is_published: bool,
    pub owner: Id,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    #[serde(rename = "_id")]
    pub id: Id,
    pub content: String,
    pub owner: Id,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tweet {
    pub fn new(owner: Id, content: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Id::new(),
            content: content.to_string(),
            owner,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: Id,
    pub content: String,
    pub video: Id,
    pub owner: Id,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(owner: Id, video: Id, content: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Id::new(),
            content: content.to_string(),
            video,
            owner,
            created_at: now,
            updated_at: now,
        }
    }
}

/// What a like points at. Exactly one per like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeTarget {
    Video(Id),
    Comment(Id),
    Tweet(Id),
}

impl LikeTarget {
    /// Document field holding the target reference.
    pub fn field(&self) -> &'static str {
        match self {
            LikeTarget::Video(_) => "video",
            LikeTarget::Comment(_) => "comment",
            LikeTarget::Tweet(_) => "tweet",
        }
    }

    pub fn id(&self) -> Id {
        match self {
            LikeTarget::Video(id) | LikeTarget::Comment(id) | LikeTarget::Tweet(id) => *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    #[serde(rename = "_id")]
    pub id: Id,
    pub liked_by: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tweet: Option<Id>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Like {
    pub fn new(liked_by: Id, target: LikeTarget) -> Self {
        let now = Utc::now();
        let mut like = Self {
            id: Id::new(),
            liked_by,
            video: None,
            comment: None,
            tweet: None,
            created_at: now,
            updated_at: now,
        };
        match target {
            LikeTarget::Video(id) => like.video = Some(id),
            LikeTarget::Comment(id) => like.comment = Some(id),
            LikeTarget::Tweet(id) => like.tweet = Some(id),
        }
        like
    }

    pub fn target(&self) -> Option<LikeTarget> {
        match (self.video, self.comment, self.tweet) {
            (Some(id), None, None) => Some(LikeTarget::Video(id)),
            (None, Some(id), None) => Some(LikeTarget::Comment(id)),
            (None, None, Some(id)) => Some(LikeTarget::Tweet(id)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[serde(rename = "_id")]
    pub id: Id,
    pub subscriber: Id,
    pub channel: Id,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    pub fn new(subscriber: Id, channel: Id) -> Self {
        let now = Utc::now();
        Self {
            id: Id::new(),
            subscriber,
            channel,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    #[serde(rename = "_id")]
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub videos: Vec<Id>,
    pub owner: Id,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Playlist {
    pub fn new(owner: Id, name: &str, description: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Id::new(),
            name: name.to_string(),
            description: description.to_string(),
            videos: Vec::new(),
            owner,
            created_at: now,
            updated_at: now,
        }
    }
}
