//! Redis error types for the document store adapter.

use crate::ports::store::StoreError;
use deadpool_redis::CreatePoolError;
use std::fmt;

pub type RedisError = deadpool_redis::redis::RedisError;
pub type PoolError = deadpool_redis::PoolError;

#[derive(Debug)]
pub enum RedisStoreError {
    Redis(RedisError),
    Pool(PoolError),
    Serialization(serde_json::Error),
    CreatePool(String),
    Corrupt(String),
}

impl fmt::Display for RedisStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedisStoreError::Redis(e) => write!(f, "Redis error: {}", e),
            RedisStoreError::Pool(e) => write!(f, "Pool error: {}", e),
            RedisStoreError::Serialization(e) => write!(f, "Serialization error: {}", e),
            RedisStoreError::CreatePool(e) => write!(f, "Create pool error: {}", e),
            RedisStoreError::Corrupt(key) => write!(f, "Stored document is not an object: {}", key),
        }
    }
}

impl std::error::Error for RedisStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RedisStoreError::Redis(e) => Some(e),
            RedisStoreError::Pool(e) => Some(e),
            RedisStoreError::Serialization(e) => Some(e),
            RedisStoreError::CreatePool(_) | RedisStoreError::Corrupt(_) => None,
        }
    }
}

impl From<RedisError> for RedisStoreError {
    fn from(err: RedisError) -> Self {
        RedisStoreError::Redis(err)
    }
}

impl From<PoolError> for RedisStoreError {
    fn from(err: PoolError) -> Self {
        RedisStoreError::Pool(err)
    }
}

impl From<serde_json::Error> for RedisStoreError {
    fn from(err: serde_json::Error) -> Self {
        RedisStoreError::Serialization(err)
    }
}

impl From<CreatePoolError> for RedisStoreError {
    fn from(err: CreatePoolError) -> Self {
        RedisStoreError::CreatePool(format!("{}", err))
    }
}

impl From<RedisStoreError> for StoreError {
    fn from(err: RedisStoreError) -> Self {
        match err {
            RedisStoreError::Serialization(e) => StoreError::Serialization(e),
            other => StoreError::Backend(other.to_string()),
        }
    }
}
