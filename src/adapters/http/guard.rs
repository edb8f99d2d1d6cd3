use super::auth::AuthUser;
use super::AppState;
use crate::application::guard::{authorize, OwnedResource, OwnerContext};
use crate::domain::Id;
use crate::error::ApiError;
use axum::async_trait;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use std::collections::HashMap;

/// Extractor for routes that mutate an owned resource. Authenticates the
/// caller, reads the resource id from the route parameter named by the
/// resource kind, and runs the ownership guard.
pub struct Owned<R>(pub OwnerContext<R>);

#[async_trait]
impl<R: OwnedResource> FromRequestParts<AppState> for Owned<R> {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(principal) = AuthUser::from_request_parts(parts, state).await?;

        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state).await?;
        let param = R::KIND.path_param();
        let raw = params
            .get(param)
            .ok_or_else(|| ApiError::invalid(format!("Missing {}", param)))?;
        let resource_id = Id::parse(raw)?;

        let ctx = authorize(&state.store, principal, resource_id).await?;
        Ok(Owned(ctx))
    }
}
