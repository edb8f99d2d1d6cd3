use super::guard::OwnerContext;
use super::is_blank;
use super::views::{TweetWithOwner, ViewBuilder};
use crate::domain::models::Tweet;
use crate::domain::Id;
use crate::error::{ApiError, ApiResult};
use crate::ports::store::{from_document, to_document, Collection, Document, DocumentStore, Filter, Update};

pub struct TweetService<S> {
    store: S,
}

impl<S> TweetService<S>
where
    S: DocumentStore + Clone,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn create(&self, owner: Id, content: &str) -> ApiResult<TweetWithOwner> {
        if is_blank(content) {
            return Err(ApiError::invalid("Content is required"));
        }
        let tweet = Tweet::new(owner, content.trim());
        self.store
            .insert(Collection::Tweets, to_document(&tweet)?)
            .await
            .map_err(|e| ApiError::internal_from("Failed to create tweet", e))?;

        ViewBuilder::new(self.store.clone()).tweet_with_owner(tweet).await
    }

    pub async fn user_tweets(&self, user: Id) -> ApiResult<Vec<Document>> {
        ViewBuilder::new(self.store.clone()).list_user_tweets(user).await
    }

    pub async fn update(&self, ctx: OwnerContext<Tweet>, content: &str) -> ApiResult<Tweet> {
        if is_blank(content) {
            return Err(ApiError::invalid("Content is required"));
        }
        let doc = self
            .store
            .update_one(
                Collection::Tweets,
                &Filter::id(ctx.resource.id),
                &Update::new().set("content", content.trim()),
            )
            .await?
            .ok_or_else(|| ApiError::not_found("Tweet not found"))?;
        Ok(from_document(doc)?)
    }

    pub async fn delete(&self, ctx: OwnerContext<Tweet>) -> ApiResult<()> {
        self.store
            .delete_one(Collection::Tweets, &Filter::id(ctx.resource.id))
            .await?
            .ok_or_else(|| ApiError::not_found("Tweet not found"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fixtures;

    #[tokio::test]
    async fn test_create_embeds_owner_profile() {
        let store = fixtures::store();
        let alice = fixtures::user(&store, "alice").await;
        let tweets = TweetService::new(store.clone());

        let created = tweets.create(alice.id, "  hello world ").await.unwrap();
        assert_eq!(created.content, "hello world");
        let owner = created.owner.unwrap();
        assert_eq!(owner.username, "alice");
        assert_eq!(owner.email.as_deref(), Some("alice@example.com"));

        assert!(tweets.create(alice.id, "   ").await.is_err());
        assert_eq!(tweets.user_tweets(alice.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = fixtures::store();
        let alice = fixtures::user(&store, "alice").await;
        let tweet = fixtures::tweet(&store, alice.id, "draft").await;
        let tweets = TweetService::new(store.clone());

        let ctx = OwnerContext {
            principal: alice.clone(),
            resource: tweet.clone(),
        };
        let updated = tweets.update(ctx, "final").await.unwrap();
        assert_eq!(updated.content, "final");
        assert_eq!(updated.id, tweet.id);

        let ctx = OwnerContext {
            principal: alice,
            resource: updated,
        };
        tweets.delete(ctx.clone()).await.unwrap();
        assert_eq!(tweets.delete(ctx).await.unwrap_err().status_code(), 404);
    }
}
