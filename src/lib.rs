//! Reelbase - video-sharing platform backend
//!
//! Hexagonal Architecture:
//! - domain/: Records, ids and pagination
//! - ports/: Trait definitions (document store, media storage, auth)
//! - adapters/: Concrete implementations (memory, redis, local fs, s3, jwt, http)
//! - application/: Services, ownership guard, toggles and read views
//! - config: Environment configuration
//!
//! # Features
//! - `redis`: Redis document store
//! - `local`: Filesystem media storage and the `monolith` binary
//! - `aws`: S3 media storage and the `aws_api` binary
//! - `full`: All features

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
