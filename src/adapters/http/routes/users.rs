use crate::adapters::http::auth::AuthUser;
use crate::adapters::http::envelope::ApiResponse;
use crate::adapters::http::AppState;
use crate::application::views::HistoryEntry;
use crate::domain::models::User;
use crate::error::ApiResult;
use axum::extract::State;
use axum::routing::get;
use axum::Router;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/current-user", get(current_user))
        .route("/history", get(watch_history))
}

async fn current_user(AuthUser(user): AuthUser) -> ApiResponse<User> {
    ApiResponse::ok(user, "Current user fetched successfully")
}

async fn watch_history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<ApiResponse<Vec<HistoryEntry>>> {
    let history = state.users().watch_history(&user).await?;
    Ok(ApiResponse::ok(history, "Watch history fetched successfully"))
}
