//! Ownership guard.
//!
//! Binds a resource to its creator before a mutation is allowed. The guard
//! performs exactly one read and hands the fetched resource to the caller
//! inside an [`OwnerContext`], so handlers never fetch it again.

use crate::domain::models::{Comment, Playlist, Tweet, User, Video};
use crate::domain::Id;
use crate::error::{ApiError, ApiResult};
use crate::ports::store::{from_document, Collection, DocumentStore, Filter};
use serde::de::DeserializeOwned;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Video,
    Tweet,
    Playlist,
    Comment,
}

impl ResourceKind {
    pub fn collection(&self) -> Collection {
        match self {
            ResourceKind::Video => Collection::Videos,
            ResourceKind::Tweet => Collection::Tweets,
            ResourceKind::Playlist => Collection::Playlists,
            ResourceKind::Comment => Collection::Comments,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Video => "Video",
            ResourceKind::Tweet => "Tweet",
            ResourceKind::Playlist => "Playlist",
            ResourceKind::Comment => "Comment",
        }
    }

    /// Route parameter carrying the resource id.
    pub fn path_param(&self) -> &'static str {
        match self {
            ResourceKind::Video => "videoId",
            ResourceKind::Tweet => "tweetId",
            ResourceKind::Playlist => "playlistId",
            ResourceKind::Comment => "commentId",
        }
    }
}

pub trait OwnedResource: DeserializeOwned + Send + Sync + 'static {
    const KIND: ResourceKind;

    fn id(&self) -> Id;

    fn owner(&self) -> Id;
}

impl OwnedResource for Video {
    const KIND: ResourceKind = ResourceKind::Video;

    fn id(&self) -> Id {
        self.id
    }

    fn owner(&self) -> Id {
        self.owner
    }
}

impl OwnedResource for Tweet {
    const KIND: ResourceKind = ResourceKind::Tweet;

    fn id(&self) -> Id {
        self.id
    }

    fn owner(&self) -> Id {
        self.owner
    }
}

impl OwnedResource for Playlist {
    const KIND: ResourceKind = ResourceKind::Playlist;

    fn id(&self) -> Id {
        self.id
    }

    fn owner(&self) -> Id {
        self.owner
    }
}

impl OwnedResource for Comment {
    const KIND: ResourceKind = ResourceKind::Comment;

    fn id(&self) -> Id {
        self.id
    }

    fn owner(&self) -> Id {
        self.owner
    }
}

/// Per-route request context: the authenticated principal plus the resource
/// the guard already fetched and verified.
#[derive(Debug, Clone)]
pub struct OwnerContext<R> {
    pub principal: User,
    pub resource: R,
}

pub async fn verify_ownership<S, R>(store: &S, resource_id: Id, principal_id: Id) -> ApiResult<R>
where
    S: DocumentStore + ?Sized,
    R: OwnedResource,
{
    let kind = R::KIND;
    let doc = store
        .find_one(kind.collection(), &Filter::id(resource_id))
        .await?
        .ok_or_else(|| ApiError::not_found(format!("{} not found", kind.label())))?;
    let resource: R = from_document(doc)?;

    if resource.owner() != principal_id {
        tracing::debug!(
            kind = kind.label(),
            resource = %resource_id,
            principal = %principal_id,
            "ownership check failed"
        );
        return Err(ApiError::forbidden());
    }
    Ok(resource)
}

pub async fn authorize<S, R>(store: &S, principal: User, resource_id: Id) -> ApiResult<OwnerContext<R>>
where
    S: DocumentStore + ?Sized,
    R: OwnedResource,
{
    let resource = verify_ownership(store, resource_id, principal.id).await?;
    Ok(OwnerContext {
        principal,
        resource,
    })
}
