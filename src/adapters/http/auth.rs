use super::AppState;
use crate::domain::models::User;
use crate::error::ApiError;
use crate::ports::auth::AuthError;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;

const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Authenticated principal, resolved from the `accessToken` cookie or an
/// `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == ACCESS_TOKEN_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = cookie_token(&parts.headers)
            .or_else(|| bearer_token(&parts.headers))
            .ok_or(AuthError::MissingToken)?;

        let user = state.auth.resolve(&token).await.map_err(|e| {
            tracing::debug!(error = %e, "rejected access token");
            ApiError::from(e)
        })?;
        Ok(AuthUser(user))
    }
}
