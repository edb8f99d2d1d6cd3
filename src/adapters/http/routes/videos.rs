use super::path_id;
use crate::adapters::http::auth::AuthUser;
use crate::adapters::http::envelope::{empty, ApiResponse};
use crate::adapters::http::guard::Owned;
use crate::adapters::http::upload::UploadForm;
use crate::adapters::http::AppState;
use crate::application::views::{VideoListParams, VideoPage, VideoSort};
use crate::application::videos::{PublishMedia, VideoChanges, VideoMetadata};
use crate::domain::models::Video;
use crate::domain::pagination::{Page, PageParams};
use crate::domain::Id;
use crate::error::{ApiError, ApiResult};
use crate::ports::store::SortOrder;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::QueryRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::routing::{get, patch, post};
use axum::Router;
use serde::Deserialize;
use serde_json::Value;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_videos))
        .route("/publish", post(publish_video))
        .route(
            "/:videoId",
            get(get_video).patch(update_video).delete(delete_video),
        )
        .route("/toggle-publish/:videoId", patch(toggle_publish))
        .layer(DefaultBodyLimit::disable())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoListQuery {
    page: Option<String>,
    limit: Option<String>,
    query: Option<String>,
    sort_by: Option<String>,
    sort_type: Option<String>,
    user_id: Option<String>,
}

impl TryFrom<VideoListQuery> for VideoListParams {
    type Error = ApiError;

    fn try_from(q: VideoListQuery) -> Result<Self, Self::Error> {
        let page = Page::try_from(&PageParams {
            page: q.page,
            limit: q.limit,
        })?;
        let sort_by = match q.sort_by.as_deref().filter(|s| !s.is_empty()) {
            None => VideoSort::CreatedAt,
            Some(raw) => VideoSort::parse(raw)
                .ok_or_else(|| ApiError::invalid(format!("Cannot sort videos by {}", raw)))?,
        };
        let order = match q.sort_type.as_deref() {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        };
        let owner = match q.user_id.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => Some(Id::parse(raw)?),
            None => None,
        };

        Ok(VideoListParams {
            page,
            query: q.query,
            sort_by,
            order,
            owner,
        })
    }
}

async fn list_videos(
    State(state): State<AppState>,
    query: Result<Query<VideoListQuery>, QueryRejection>,
) -> ApiResult<ApiResponse<VideoPage>> {
    let Query(query) = query?;
    let params = VideoListParams::try_from(query)?;
    let page = state.videos().list(&params).await?;
    Ok(ApiResponse::ok(page, "Videos retrieved successfully"))
}

async fn publish_video(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<ApiResponse<Video>> {
    let mut form =
        UploadForm::receive(multipart?, &state.upload_dir, &["videoFile", "thumbnail"]).await?;

    let media = PublishMedia {
        video_file: form.take_file("videoFile"),
        thumbnail: form.take_file("thumbnail"),
    };
    let meta = VideoMetadata {
        title: form.text("title"),
        description: form.text("description"),
        duration: form.text("duration"),
    };
    form.discard().await;

    let video = state.videos().publish(user.id, media, meta).await?;
    Ok(ApiResponse::created(video, "Video created successfully"))
}

async fn get_video(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(video_id): Path<String>,
) -> ApiResult<ApiResponse<Video>> {
    let video = state.videos().get_by_id(user.id, path_id(&video_id)?).await?;
    Ok(ApiResponse::ok(video, "Video found successfully"))
}

async fn update_video(
    State(state): State<AppState>,
    Owned(ctx): Owned<Video>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<ApiResponse<Video>> {
    let mut form = UploadForm::receive(multipart?, &state.upload_dir, &["thumbnail"]).await?;

    let changes = VideoChanges {
        title: form.text("title"),
        description: form.text("description"),
        thumbnail: form.take_file("thumbnail"),
    };
    form.discard().await;

    let video = state.videos().update(ctx, changes).await?;
    Ok(ApiResponse::ok(video, "Video updated successfully"))
}

async fn delete_video(
    State(state): State<AppState>,
    Owned(ctx): Owned<Video>,
) -> ApiResult<ApiResponse<Value>> {
    state.videos().delete(ctx).await?;
    Ok(ApiResponse::ok(empty(), "Video deleted successfully"))
}

async fn toggle_publish(
    State(state): State<AppState>,
    Owned(ctx): Owned<Video>,
) -> ApiResult<ApiResponse<Video>> {
    let video = state.videos().toggle_publish(ctx).await?;
    Ok(ApiResponse::ok(
        video,
        "Video publish status toggled successfully",
    ))
}

#[cfg(all(test, feature = "local"))]
mod tests {
    use crate::adapters::http::router;
    use crate::adapters::http::testing::{request, send, state_with};
    use crate::adapters::jwt::testing::token_for;
    use crate::adapters::local::fs::FsMediaStorage;
    use crate::application::fixtures;
    use crate::ports::store::{Collection, DocumentStore, Filter};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tempfile::tempdir;

    const BOUNDARY: &str = "reelbase-test-boundary";

    fn multipart_body(texts: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in texts {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    BOUNDARY, name, value
                )
                .as_bytes(),
            );
        }
        for (name, file_name, bytes) in files {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    BOUNDARY, name, file_name
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn upload_request(uri: &str, token: &str, body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Authorization", format!("Bearer {}", token))
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn dir_is_empty(path: &std::path::Path) -> bool {
        std::fs::read_dir(path)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(true)
    }

    #[tokio::test]
    async fn test_publish_then_fetch() {
        let store = fixtures::store();
        let alice = fixtures::user(&store, "alice").await;
        let uploads = tempdir().unwrap();
        let media_dir = tempdir().unwrap();
        let media = Arc::new(FsMediaStorage::new(media_dir.path(), "http://localhost/media"));
        let app = router(state_with(store.clone(), media, uploads.path().to_path_buf()));
        let token = token_for(alice.id);

        let body = multipart_body(
            &[("title", "Hello"), ("description", "first"), ("duration", "3.5")],
            &[
                ("videoFile", "clip.mp4", &b"video-bytes"[..]),
                ("thumbnail", "thumb.png", &b"png-bytes"[..]),
            ],
        );
        let (status, json) = send(&app, upload_request("/api/v1/videos/publish", &token, body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["data"]["isPublished"], false);
        assert_eq!(json["data"]["duration"], 3.5);
        assert!(dir_is_empty(uploads.path()));

        let id = json["data"]["_id"].as_str().unwrap().to_string();
        let uri = format!("/api/v1/videos/{}", id);
        let (status, json) = send(&app, request("GET", &uri, Some(&token), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["views"], 1);

        // unpublished videos are not listed
        let (status, json) = send(&app, request("GET", "/api/v1/videos", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["total"], 0);
        assert_eq!(json["data"]["videos"], serde_json::json!([]));

        let toggle = format!("/api/v1/videos/toggle-publish/{}", id);
        let (status, json) = send(&app, request("PATCH", &toggle, Some(&token), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["isPublished"], true);

        let (_, json) = send(&app, request("GET", "/api/v1/videos?query=HELLO", None, None)).await;
        assert_eq!(json["data"]["total"], 1);
    }

    #[tokio::test]
    async fn test_publish_with_blank_title_cleans_up() {
        let store = fixtures::store();
        let alice = fixtures::user(&store, "alice").await;
        let uploads = tempdir().unwrap();
        let media_dir = tempdir().unwrap();
        let media = Arc::new(FsMediaStorage::new(media_dir.path(), "/media"));
        let app = router(state_with(store.clone(), media, uploads.path().to_path_buf()));

        let body = multipart_body(
            &[("title", " "), ("description", "first"), ("duration", "3")],
            &[
                ("videoFile", "clip.mp4", &b"video-bytes"[..]),
                ("thumbnail", "thumb.png", &b"png-bytes"[..]),
            ],
        );
        let (status, json) = send(
            &app,
            upload_request("/api/v1/videos/publish", &token_for(alice.id), body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "All fields are required");
        assert!(dir_is_empty(uploads.path()));
        assert!(dir_is_empty(media_dir.path()));
        assert_eq!(store.count(Collection::Videos, &Filter::All).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_owner_routes_are_guarded() {
        let store = fixtures::store();
        let alice = fixtures::user(&store, "alice").await;
        let bob = fixtures::user(&store, "bob").await;
        let video = fixtures::video(&store, alice.id, false).await;
        let uploads = tempdir().unwrap();
        let media = Arc::new(FsMediaStorage::new(uploads.path(), "/media"));
        let app = router(state_with(store.clone(), media, uploads.path().to_path_buf()));

        let uri = format!("/api/v1/videos/toggle-publish/{}", video.id);
        let (status, json) = send(&app, request("PATCH", &uri, Some(&token_for(bob.id)), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["message"], "Access denied");

        let (status, _) = send(&app, request("PATCH", &uri, None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let missing = format!("/api/v1/videos/{}", crate::domain::Id::new());
        let (status, json) = send(&app, request("DELETE", &missing, Some(&token_for(alice.id)), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], "Video not found");

        let (status, _) = send(&app, request("GET", "/api/v1/videos/not-an-id", Some(&token_for(alice.id)), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, request("GET", "/api/v1/videos?sortBy=password", None, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
