use super::{path_id, toggled};
use crate::adapters::http::auth::AuthUser;
use crate::adapters::http::envelope::ApiResponse;
use crate::adapters::http::AppState;
use crate::application::views::{SubscribedChannelEntry, SubscriberEntry};
use crate::error::ApiResult;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::Router;
use serde_json::Value;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/c/:channelId",
            get(subscribed_channels).post(toggle_subscription),
        )
        .route("/u/:channelId", get(channel_subscribers))
}

async fn toggle_subscription(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(channel_id): Path<String>,
) -> ApiResult<ApiResponse<Value>> {
    let channel = path_id(&channel_id)?;
    let outcome = state
        .subscriptions()
        .toggle_subscription(user.id, channel)
        .await?;
    toggled(
        outcome,
        "Subscribed successfully",
        "Unsubscribed successfully",
    )
}

/// Channels the caller follows. The path segment is accepted but unused.
async fn subscribed_channels(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(_channel_id): Path<String>,
) -> ApiResult<ApiResponse<Vec<SubscribedChannelEntry>>> {
    let channels = state.subscriptions().subscribed_channels(user.id).await?;
    Ok(ApiResponse::ok(
        channels,
        "Subscribed channels fetched successfully",
    ))
}

async fn channel_subscribers(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> ApiResult<ApiResponse<Vec<SubscriberEntry>>> {
    let subscribers = state
        .subscriptions()
        .subscribers(path_id(&channel_id)?)
        .await?;
    Ok(ApiResponse::ok(
        subscribers,
        "Subscribers fetched successfully",
    ))
}
