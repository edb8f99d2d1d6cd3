use super::guard::OwnerContext;
use super::is_blank;
use super::views::{CommentPage, ViewBuilder};
use crate::domain::models::Comment;
use crate::domain::pagination::Page;
use crate::domain::Id;
use crate::error::{ApiError, ApiResult};
use crate::ports::store::{from_document, to_document, Collection, DocumentStore, Filter, Update};

pub struct CommentService<S> {
    store: S,
}

impl<S> CommentService<S>
where
    S: DocumentStore + Clone,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn list(&self, video: Id, page: Page) -> ApiResult<CommentPage> {
        ViewBuilder::new(self.store.clone())
            .list_video_comments(video, page)
            .await
    }

    pub async fn add(&self, owner: Id, video: Id, content: &str) -> ApiResult<Comment> {
        if is_blank(content) {
            return Err(ApiError::invalid("Content is required"));
        }
        if self.store.count(Collection::Videos, &Filter::id(video)).await? == 0 {
            return Err(ApiError::not_found("Video not found"));
        }

        let comment = Comment::new(owner, video, content.trim());
        self.store
            .insert(Collection::Comments, to_document(&comment)?)
            .await
            .map_err(|e| ApiError::internal_from("Failed to add comment", e))?;
        Ok(comment)
    }

    pub async fn update(&self, ctx: OwnerContext<Comment>, content: &str) -> ApiResult<Comment> {
        if is_blank(content) {
            return Err(ApiError::invalid("Content is required"));
        }
        let doc = self
            .store
            .update_one(
                Collection::Comments,
                &Filter::id(ctx.resource.id),
                &Update::new().set("content", content.trim()),
            )
            .await?
            .ok_or_else(|| ApiError::not_found("Comment not found"))?;
        Ok(from_document(doc)?)
    }

    pub async fn delete(&self, ctx: OwnerContext<Comment>) -> ApiResult<()> {
        self.store
            .delete_one(Collection::Comments, &Filter::id(ctx.resource.id))
            .await?
            .ok_or_else(|| ApiError::not_found("Comment not found"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fixtures;

    #[tokio::test]
    async fn test_add_requires_existing_video() {
        let store = fixtures::store();
        let alice = fixtures::user(&store, "alice").await;
        let video = fixtures::video(&store, alice.id, true).await;
        let comments = CommentService::new(store.clone());

        let added = comments.add(alice.id, video.id, "great").await.unwrap();
        assert_eq!(added.video, video.id);

        let err = comments.add(alice.id, Id::new(), "lost").await.unwrap_err();
        assert_eq!(err.status_code(), 404);
        let err = comments.add(alice.id, video.id, "").await.unwrap_err();
        assert_eq!(err.status_code(), 400);

        let page = comments.list(video.id, Page::default()).await.unwrap();
        assert_eq!(page.total_comments, 1);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = fixtures::store();
        let alice = fixtures::user(&store, "alice").await;
        let video = fixtures::video(&store, alice.id, true).await;
        let comment = fixtures::comment(&store, alice.id, video.id, "frist").await;
        let comments = CommentService::new(store.clone());

        let ctx = OwnerContext {
            principal: alice.clone(),
            resource: comment,
        };
        let updated = comments.update(ctx, "first").await.unwrap();
        assert_eq!(updated.content, "first");

        let ctx = OwnerContext {
            principal: alice,
            resource: updated,
        };
        comments.delete(ctx).await.unwrap();
        let page = comments.list(video.id, Page::default()).await.unwrap();
        assert_eq!(page.total_comments, 0);
    }
}
