use super::envelope::{empty, ApiResponse};
use super::AppState;
use crate::application::toggle::Toggled;
use crate::domain::Id;
use crate::error::{ApiError, ApiResult};
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::Value;

mod comments;
mod dashboard;
mod healthcheck;
mod likes;
mod playlists;
mod subscriptions;
mod tweets;
mod users;
mod videos;

pub(super) fn api() -> Router<AppState> {
    Router::new()
        .nest("/healthcheck", healthcheck::routes())
        .nest("/users", users::routes())
        .nest("/videos", videos::routes())
        .nest("/tweets", tweets::routes())
        .nest("/subscriptions", subscriptions::routes())
        .nest("/likes", likes::routes())
        .nest("/comments", comments::routes())
        .nest("/playlists", playlists::routes())
        .nest("/dashboard", dashboard::routes())
}

/// JSON body of tweet and comment writes.
#[derive(Debug, Default, Deserialize)]
struct ContentBody {
    #[serde(default)]
    content: String,
}

/// Parse an id taken from the route path.
fn path_id(raw: &str) -> ApiResult<Id> {
    Ok(Id::parse(raw)?)
}

/// Added toggles answer with the new record, removed ones with `{}`.
fn toggled<T: Serialize>(
    outcome: Toggled<T>,
    added: &str,
    removed: &str,
) -> ApiResult<ApiResponse<Value>> {
    match outcome {
        Toggled::Added(record) => {
            let data = serde_json::to_value(record)
                .map_err(|e| ApiError::internal_from("Failed to encode response", e))?;
            Ok(ApiResponse::ok(data, added))
        }
        Toggled::Removed => Ok(ApiResponse::ok(empty(), removed)),
    }
}
