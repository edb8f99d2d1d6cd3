//! Error taxonomy shared by the application services and the HTTP adapter.

use crate::domain::id::InvalidId;
use crate::domain::pagination::InvalidPage;
use crate::ports::auth::AuthError;
use crate::ports::media::MediaError;
use crate::ports::store::StoreError;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    InvalidArgument {
        message: String,
        errors: Vec<String>,
    },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// `message` is what the client sees; `source` is only logged.
    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl ApiError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ApiError::InvalidArgument {
            message: message.into(),
            errors: Vec::new(),
        }
    }

    pub fn invalid_with(message: impl Into<String>, errors: Vec<String>) -> Self {
        ApiError::InvalidArgument {
            message: message.into(),
            errors,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn forbidden() -> Self {
        ApiError::Forbidden("Access denied".to_string())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Internal failure with a client-facing message and a logged cause.
    pub fn internal_from(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        ApiError::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidArgument { .. } => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Internal { .. } => 500,
        }
    }

    pub fn details(&self) -> &[String] {
        match self {
            ApiError::InvalidArgument { errors, .. } => errors,
            _ => &[],
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::internal_from("Internal Server Error", err)
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        ApiError::internal_from("Media storage failure", err)
    }
}

impl From<InvalidId> for ApiError {
    fn from(err: InvalidId) -> Self {
        ApiError::invalid(err.to_string())
    }
}

impl From<InvalidPage> for ApiError {
    fn from(err: InvalidPage) -> Self {
        ApiError::invalid(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Lookup(_) => ApiError::internal_from("Internal Server Error", err),
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
