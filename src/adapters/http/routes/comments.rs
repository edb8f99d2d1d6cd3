use super::{path_id, ContentBody};
use crate::adapters::http::auth::AuthUser;
use crate::adapters::http::envelope::{empty, ApiResponse};
use crate::adapters::http::guard::Owned;
use crate::adapters::http::AppState;
use crate::application::views::CommentPage;
use crate::domain::models::Comment;
use crate::domain::pagination::{Page, PageParams};
use crate::error::ApiResult;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde_json::Value;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/:videoId", get(video_comments).post(add_comment))
        .route("/c/:commentId", patch(update_comment).delete(delete_comment))
}

async fn video_comments(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<ApiResponse<CommentPage>> {
    let Query(params) = params?;
    let page = Page::try_from(&params)?;
    let comments = state.comments().list(path_id(&video_id)?, page).await?;
    Ok(ApiResponse::ok(comments, "Comments fetched successfully"))
}

async fn add_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(video_id): Path<String>,
    body: Result<Json<ContentBody>, JsonRejection>,
) -> ApiResult<ApiResponse<Comment>> {
    let video = path_id(&video_id)?;
    let Json(body) = body?;
    let comment = state.comments().add(user.id, video, &body.content).await?;
    Ok(ApiResponse::created(comment, "Comment added successfully"))
}

async fn update_comment(
    State(state): State<AppState>,
    Owned(ctx): Owned<Comment>,
    body: Result<Json<ContentBody>, JsonRejection>,
) -> ApiResult<ApiResponse<Comment>> {
    let Json(body) = body?;
    let comment = state.comments().update(ctx, &body.content).await?;
    Ok(ApiResponse::ok(comment, "Comment updated successfully"))
}

async fn delete_comment(
    State(state): State<AppState>,
    Owned(ctx): Owned<Comment>,
) -> ApiResult<ApiResponse<Value>> {
    state.comments().delete(ctx).await?;
    Ok(ApiResponse::ok(empty(), "Comment deleted successfully"))
}
