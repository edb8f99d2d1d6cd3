use crate::domain::models::User;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Unauthorized")]
    MissingToken,

    #[error("Invalid access token: {0}")]
    InvalidToken(String),

    #[error("Unauthorized user")]
    UnknownUser,

    #[error("Principal lookup failed: {0}")]
    Lookup(String),
}

/// Resolves an access token into the authenticated user.
#[async_trait]
pub trait PrincipalResolver: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<User, AuthError>;
}
