use super::{path_id, toggled};
use crate::adapters::http::auth::AuthUser;
use crate::adapters::http::envelope::ApiResponse;
use crate::adapters::http::AppState;
use crate::application::views::LikedVideo;
use crate::domain::models::LikeTarget;
use crate::error::ApiResult;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Router;
use serde_json::Value;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/toggle/v/:videoId", post(toggle_video_like))
        .route("/toggle/c/:commentId", post(toggle_comment_like))
        .route("/toggle/t/:tweetId", post(toggle_tweet_like))
        .route("/videos", get(liked_videos))
}

async fn toggle_like(state: &AppState, actor: &AuthUser, target: LikeTarget) -> ApiResult<ApiResponse<Value>> {
    let outcome = state.likes().toggle_like(actor.0.id, target).await?;
    toggled(outcome, "Liked successfully", "Unliked successfully")
}

async fn toggle_video_like(
    State(state): State<AppState>,
    user: AuthUser,
    Path(video_id): Path<String>,
) -> ApiResult<ApiResponse<Value>> {
    toggle_like(&state, &user, LikeTarget::Video(path_id(&video_id)?)).await
}

async fn toggle_comment_like(
    State(state): State<AppState>,
    user: AuthUser,
    Path(comment_id): Path<String>,
) -> ApiResult<ApiResponse<Value>> {
    toggle_like(&state, &user, LikeTarget::Comment(path_id(&comment_id)?)).await
}

async fn toggle_tweet_like(
    State(state): State<AppState>,
    user: AuthUser,
    Path(tweet_id): Path<String>,
) -> ApiResult<ApiResponse<Value>> {
    toggle_like(&state, &user, LikeTarget::Tweet(path_id(&tweet_id)?)).await
}

async fn liked_videos(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<ApiResponse<Vec<LikedVideo>>> {
    let videos = state.likes().liked_videos(user.id).await?;
    Ok(ApiResponse::ok(videos, "Liked videos fetched successfully"))
}

#[cfg(test)]
mod tests {
    use crate::adapters::http::router;
    use crate::adapters::http::testing::{request, send, state_with};
    use crate::adapters::jwt::testing::token_for;
    use crate::application::fixtures;
    use crate::domain::Id;
    use crate::ports::media::MockMediaStorage;
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_video_like_round_trip() {
        let store = fixtures::store();
        let alice = fixtures::user(&store, "alice").await;
        let bob = fixtures::user(&store, "bob").await;
        let video = fixtures::video(&store, bob.id, true).await;
        let uploads = tempfile::tempdir().unwrap();
        let app = router(state_with(
            store,
            Arc::new(MockMediaStorage::new()),
            uploads.path().to_path_buf(),
        ));
        let token = token_for(alice.id);
        let uri = format!("/api/v1/likes/toggle/v/{}", video.id);

        let (status, body) = send(&app, request("POST", &uri, Some(&token), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Liked successfully");
        assert_eq!(body["data"]["video"], video.id.to_string());

        let (_, body) = send(&app, request("GET", "/api/v1/likes/videos", Some(&token), None)).await;
        assert_eq!(body["data"][0]["video"]["_id"], video.id.to_string());

        let (_, body) = send(&app, request("POST", &uri, Some(&token), None)).await;
        assert_eq!(body["message"], "Unliked successfully");
        assert_eq!(body["data"], json!({}));

        let (_, body) = send(&app, request("GET", "/api/v1/likes/videos", Some(&token), None)).await;
        assert_eq!(body["data"], json!([]));
    }

    #[tokio::test]
    async fn test_missing_target_is_not_found() {
        let store = fixtures::store();
        let alice = fixtures::user(&store, "alice").await;
        let uploads = tempfile::tempdir().unwrap();
        let app = router(state_with(
            store,
            Arc::new(MockMediaStorage::new()),
            uploads.path().to_path_buf(),
        ));

        let uri = format!("/api/v1/likes/toggle/t/{}", Id::new());
        let (status, body) = send(&app, request("POST", &uri, Some(&token_for(alice.id)), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Tweet not found");
    }
}
