//! HTTP inbound adapter.
//!
//! The `/api/v1` REST surface over the application services. Handlers only
//! parse, delegate and wrap results in the response envelope.

pub mod auth;
pub mod envelope;
pub mod guard;
mod routes;
pub mod upload;

use crate::application::comments::CommentService;
use crate::application::dashboard::DashboardService;
use crate::application::likes::LikeService;
use crate::application::playlists::PlaylistService;
use crate::application::subscriptions::SubscriptionService;
use crate::application::tweets::TweetService;
use crate::application::users::UserService;
use crate::application::videos::VideoService;
use crate::error::ApiError;
use crate::ports::auth::PrincipalResolver;
use crate::ports::media::MediaStorage;
use crate::ports::store::DocumentStore;
use axum::body::Body;
use axum::http::{HeaderValue, Response};
use axum::response::IntoResponse;
use axum::Router;
use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub type SharedStore = Arc<dyn DocumentStore>;
pub type SharedMedia = Arc<dyn MediaStorage>;

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub media: SharedMedia,
    pub auth: Arc<dyn PrincipalResolver>,
    /// Temp directory for multipart file parts.
    pub upload_dir: PathBuf,
}

impl AppState {
    pub fn videos(&self) -> VideoService<SharedStore, SharedMedia> {
        VideoService::new(self.store.clone(), self.media.clone())
    }

    pub fn tweets(&self) -> TweetService<SharedStore> {
        TweetService::new(self.store.clone())
    }

    pub fn comments(&self) -> CommentService<SharedStore> {
        CommentService::new(self.store.clone())
    }

    pub fn likes(&self) -> LikeService<SharedStore> {
        LikeService::new(self.store.clone())
    }

    pub fn subscriptions(&self) -> SubscriptionService<SharedStore> {
        SubscriptionService::new(self.store.clone())
    }

    pub fn playlists(&self) -> PlaylistService<SharedStore> {
        PlaylistService::new(self.store.clone())
    }

    pub fn dashboard(&self) -> DashboardService<SharedStore> {
        DashboardService::new(self.store.clone())
    }

    pub fn users(&self) -> UserService<SharedStore> {
        UserService::new(self.store.clone())
    }
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "handler panicked");

    ApiError::internal("Internal Server Error").into_response()
}

async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

/// Full application router with tracing and panic recovery.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api())
        .fallback(not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
}

/// CORS for the configured origin; any origin when unset or unparsable.
pub fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let allow_origin = match origin.map(HeaderValue::from_str) {
        Some(Ok(value)) => AllowOrigin::exact(value),
        Some(Err(e)) => {
            tracing::warn!(error = %e, "ignoring invalid CORS_ORIGIN");
            AllowOrigin::any()
        }
        None => AllowOrigin::any(),
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(cors::Any)
        .allow_headers(cors::Any)
}
