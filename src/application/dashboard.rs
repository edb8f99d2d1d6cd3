use super::views::{ChannelStats, ViewBuilder};
use crate::domain::Id;
use crate::error::ApiResult;
use crate::ports::store::{Document, DocumentStore};

/// Channel dashboard for the authenticated user.
pub struct DashboardService<S> {
    store: S,
}

impl<S> DashboardService<S>
where
    S: DocumentStore + Clone,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn stats(&self, owner: Id) -> ApiResult<ChannelStats> {
        ViewBuilder::new(self.store.clone())
            .get_channel_stats(owner)
            .await
    }

    pub async fn videos(&self, owner: Id) -> ApiResult<Vec<Document>> {
        ViewBuilder::new(self.store.clone())
            .list_channel_videos(owner)
            .await
    }
}
