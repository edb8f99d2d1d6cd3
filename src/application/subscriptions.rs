use super::toggle::{toggle, Toggled};
use super::views::{SubscribedChannelEntry, SubscriberEntry, ViewBuilder};
use crate::domain::models::Subscription;
use crate::domain::Id;
use crate::error::{ApiError, ApiResult};
use crate::ports::store::{Collection, DocumentStore, Filter};

pub struct SubscriptionService<S> {
    store: S,
}

impl<S> SubscriptionService<S>
where
    S: DocumentStore + Clone,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn toggle_subscription(
        &self,
        subscriber: Id,
        channel: Id,
    ) -> ApiResult<Toggled<Subscription>> {
        if subscriber == channel {
            return Err(ApiError::invalid("You cannot subscribe to yourself"));
        }
        if self.store.count(Collection::Users, &Filter::id(channel)).await? == 0 {
            return Err(ApiError::not_found("Channel not found"));
        }

        let pair = Filter::eq("subscriber", subscriber).and(Filter::eq("channel", channel));
        let toggled = toggle(
            &self.store,
            Collection::Subscriptions,
            Subscription::new(subscriber, channel),
            pair,
        )
        .await?;
        tracing::info!(
            subscriber = %subscriber,
            channel = %channel,
            subscribed = toggled.is_added(),
            "subscription toggled"
        );
        Ok(toggled)
    }

    pub async fn subscribers(&self, channel: Id) -> ApiResult<Vec<SubscriberEntry>> {
        ViewBuilder::new(self.store.clone())
            .list_subscribers(channel)
            .await
    }

    pub async fn subscribed_channels(&self, subscriber: Id) -> ApiResult<Vec<SubscribedChannelEntry>> {
        ViewBuilder::new(self.store.clone())
            .list_subscriptions(subscriber)
            .await
    }
}
