use super::path_id;
use crate::adapters::http::auth::AuthUser;
use crate::adapters::http::envelope::{empty, ApiResponse};
use crate::adapters::http::guard::Owned;
use crate::adapters::http::AppState;
use crate::application::views::PlaylistDetail;
use crate::domain::models::Playlist;
use crate::domain::Id;
use crate::error::{ApiError, ApiResult};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_playlist))
        .route(
            "/:playlistId",
            get(get_playlist)
                .patch(update_playlist)
                .delete(delete_playlist),
        )
        .route("/add/:videoId/:playlistId", patch(add_video))
        .route("/remove/:videoId/:playlistId", patch(remove_video))
        .route("/user/:userId", get(user_playlists))
}

#[derive(Debug, Default, Deserialize)]
struct PlaylistBody {
    #[serde(default)]
    name: String,
    description: Option<String>,
}

fn video_param(params: &HashMap<String, String>) -> ApiResult<Id> {
    let raw = params
        .get("videoId")
        .ok_or_else(|| ApiError::invalid("Missing videoId"))?;
    path_id(raw)
}

async fn create_playlist(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    body: Result<Json<PlaylistBody>, JsonRejection>,
) -> ApiResult<ApiResponse<Playlist>> {
    let Json(body) = body?;
    let playlist = state
        .playlists()
        .create(user.id, &body.name, body.description.as_deref())
        .await?;
    Ok(ApiResponse::created(playlist, "Playlist created successfully"))
}

async fn get_playlist(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(playlist_id): Path<String>,
) -> ApiResult<ApiResponse<PlaylistDetail>> {
    let playlist = state.playlists().detail(path_id(&playlist_id)?).await?;
    Ok(ApiResponse::ok(playlist, "Playlist fetched successfully"))
}

async fn update_playlist(
    State(state): State<AppState>,
    Owned(ctx): Owned<Playlist>,
    body: Result<Json<PlaylistBody>, JsonRejection>,
) -> ApiResult<ApiResponse<Playlist>> {
    let Json(body) = body?;
    let description = body.description.unwrap_or_default();
    let playlist = state
        .playlists()
        .update(ctx, &body.name, &description)
        .await?;
    Ok(ApiResponse::ok(playlist, "Playlist updated successfully"))
}

async fn delete_playlist(
    State(state): State<AppState>,
    Owned(ctx): Owned<Playlist>,
) -> ApiResult<ApiResponse<Value>> {
    state.playlists().delete(ctx).await?;
    Ok(ApiResponse::ok(empty(), "Playlist deleted successfully"))
}

async fn add_video(
    State(state): State<AppState>,
    Owned(ctx): Owned<Playlist>,
    Path(params): Path<HashMap<String, String>>,
) -> ApiResult<ApiResponse<Playlist>> {
    let playlist = state
        .playlists()
        .add_video(ctx, video_param(&params)?)
        .await?;
    Ok(ApiResponse::ok(playlist, "Video added to playlist successfully"))
}

async fn remove_video(
    State(state): State<AppState>,
    Owned(ctx): Owned<Playlist>,
    Path(params): Path<HashMap<String, String>>,
) -> ApiResult<ApiResponse<Playlist>> {
    let playlist = state
        .playlists()
        .remove_video(ctx, video_param(&params)?)
        .await?;
    Ok(ApiResponse::ok(
        playlist,
        "Video removed from playlist successfully",
    ))
}

async fn user_playlists(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(user_id): Path<String>,
) -> ApiResult<ApiResponse<Vec<Playlist>>> {
    let playlists = state.playlists().user_playlists(path_id(&user_id)?).await?;
    Ok(ApiResponse::ok(playlists, "User playlists fetched successfully"))
}
