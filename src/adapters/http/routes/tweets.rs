use super::{path_id, ContentBody};
use crate::adapters::http::auth::AuthUser;
use crate::adapters::http::envelope::{empty, ApiResponse};
use crate::adapters::http::guard::Owned;
use crate::adapters::http::AppState;
use crate::application::views::TweetWithOwner;
use crate::domain::models::Tweet;
use crate::error::ApiResult;
use crate::ports::store::Document;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::Value;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_tweet))
        .route("/user/:userId", get(user_tweets))
        .route("/:tweetId", patch(update_tweet).delete(delete_tweet))
}

async fn create_tweet(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    body: Result<Json<ContentBody>, JsonRejection>,
) -> ApiResult<ApiResponse<TweetWithOwner>> {
    let Json(body) = body?;
    let tweet = state.tweets().create(user.id, &body.content).await?;
    Ok(ApiResponse::created(tweet, "Tweet created successfully"))
}

async fn user_tweets(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<ApiResponse<Vec<Document>>> {
    let tweets = state.tweets().user_tweets(path_id(&user_id)?).await?;
    Ok(ApiResponse::ok(tweets, "Tweets found successfully"))
}

async fn update_tweet(
    State(state): State<AppState>,
    Owned(ctx): Owned<Tweet>,
    body: Result<Json<ContentBody>, JsonRejection>,
) -> ApiResult<ApiResponse<Tweet>> {
    let Json(body) = body?;
    let tweet = state.tweets().update(ctx, &body.content).await?;
    Ok(ApiResponse::ok(tweet, "Tweet updated successfully"))
}

async fn delete_tweet(
    State(state): State<AppState>,
    Owned(ctx): Owned<Tweet>,
) -> ApiResult<ApiResponse<Value>> {
    state.tweets().delete(ctx).await?;
    Ok(ApiResponse::ok(empty(), "Tweet deleted successfully"))
}
