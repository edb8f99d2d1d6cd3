use crate::adapters::http::auth::AuthUser;
use crate::adapters::http::envelope::ApiResponse;
use crate::adapters::http::AppState;
use crate::application::views::ChannelStats;
use crate::error::ApiResult;
use crate::ports::store::Document;
use axum::extract::State;
use axum::routing::get;
use axum::Router;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(channel_stats))
        .route("/videos", get(channel_videos))
}

async fn channel_stats(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<ApiResponse<ChannelStats>> {
    let stats = state.dashboard().stats(user.id).await?;
    Ok(ApiResponse::ok(stats, "Channel stats found successfully"))
}

async fn channel_videos(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<ApiResponse<Vec<Document>>> {
    let videos = state.dashboard().videos(user.id).await?;
    Ok(ApiResponse::ok(videos, "Channel videos found successfully"))
}
