use crate::adapters::http::envelope::ApiResponse;
use crate::adapters::http::AppState;
use axum::routing::get;
use axum::Router;

pub(super) fn routes() -> Router<AppState> {
    Router::new().route("/", get(healthcheck))
}

async fn healthcheck() -> ApiResponse<&'static str> {
    ApiResponse::ok("OK", "Health check passed")
}
