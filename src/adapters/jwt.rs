//! Access-token verification.
//!
//! Tokens are minted by the identity service; this side only verifies the
//! HS256 signature and expiry, then loads the user the token names.

use crate::domain::models::User;
use crate::domain::Id;
use crate::ports::auth::{AuthError, PrincipalResolver};
use crate::ports::store::{from_document, Collection, DocumentStore, Filter};
use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    #[serde(rename = "_id")]
    pub user_id: String,
    pub exp: usize,
}

pub struct JwtResolver<S> {
    store: S,
    key: DecodingKey,
    validation: Validation,
}

impl<S: DocumentStore> JwtResolver<S> {
    pub fn new(store: S, secret: &str) -> Self {
        Self {
            store,
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

#[async_trait]
impl<S: DocumentStore> PrincipalResolver for JwtResolver<S> {
    async fn resolve(&self, token: &str) -> Result<User, AuthError> {
        let data = decode::<AccessClaims>(token, &self.key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let id = Id::parse(&data.claims.user_id)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        let doc = self
            .store
            .find_one(Collection::Users, &Filter::id(id))
            .await
            .map_err(|e| AuthError::Lookup(e.to_string()))?
            .ok_or(AuthError::UnknownUser)?;

        from_document(doc).map_err(|e| AuthError::Lookup(e.to_string()))
    }
}
