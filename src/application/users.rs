use super::views::{HistoryEntry, ViewBuilder};
use crate::domain::models::User;
use crate::error::ApiResult;
use crate::ports::store::DocumentStore;

pub struct UserService<S> {
    store: S,
}

impl<S> UserService<S>
where
    S: DocumentStore + Clone,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn watch_history(&self, user: &User) -> ApiResult<Vec<HistoryEntry>> {
        ViewBuilder::new(self.store.clone()).watch_history(user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fixtures;
    use crate::application::videos::VideoService;
    use crate::ports::media::MockMediaStorage;
    use crate::ports::store::{from_document, Collection, Filter};

    #[tokio::test]
    async fn test_history_follows_viewed_videos() {
        let store = fixtures::store();
        let owner = fixtures::user(&store, "owner").await;
        let viewer = fixtures::user(&store, "viewer").await;
        let first = fixtures::video(&store, owner.id, true).await;
        let second = fixtures::video(&store, owner.id, true).await;

        let videos = VideoService::new(store.clone(), MockMediaStorage::new());
        for id in [first.id, second.id, first.id] {
            videos.get_by_id(viewer.id, id).await.unwrap();
        }

        let doc = store
            .find_one(Collection::Users, &Filter::id(viewer.id))
            .await
            .unwrap()
            .unwrap();
        let viewer: User = from_document(doc).unwrap();

        let history = UserService::new(store.clone())
            .watch_history(&viewer)
            .await
            .unwrap();
        let ids: Vec<_> = history.iter().map(|h| h.video.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }
}
