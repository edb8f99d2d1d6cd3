//! Configuration loaded from the environment (and `.env`, when present).

use std::env;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} env var required")]
    Missing(&'static str),
    #[error("invalid {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Which document store backs the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    Redis,
    Memory,
}

impl StoreKind {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "redis" => Some(StoreKind::Redis),
            "memory" => Some(StoreKind::Memory),
            _ => None,
        }
    }
}

impl Default for StoreKind {
    fn default() -> Self {
        if cfg!(feature = "redis") {
            StoreKind::Redis
        } else {
            StoreKind::Memory
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// HTTP server bind address
    pub addr: String,
    /// HTTP server port
    pub port: u16,
    /// HMAC secret for access tokens
    pub access_token_secret: String,
    pub store: StoreKind,
    /// Redis connection URL
    pub redis_url: String,
    /// Temp directory for multipart uploads
    pub upload_dir: PathBuf,
    /// Allowed CORS origin; any origin when unset
    pub cors_origin: Option<String>,
    /// Directory served by the local media store
    pub media_dir: PathBuf,
    /// Public URL prefix of the local media store
    pub media_base_url: String,
    pub s3_bucket: Option<String>,
    pub s3_public_url: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let addr = var("ADDR").unwrap_or_else(|| String::from("127.0.0.1"));
        let port: u16 = match var("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw.clone(),
            })?,
            None => 8000,
        };
        let access_token_secret =
            var("ACCESS_TOKEN_SECRET").ok_or(ConfigError::Missing("ACCESS_TOKEN_SECRET"))?;
        let store = match var("STORE") {
            Some(raw) => StoreKind::parse(&raw).ok_or(ConfigError::Invalid {
                name: "STORE",
                value: raw,
            })?,
            None => StoreKind::default(),
        };
        let media_base_url = var("MEDIA_BASE_URL")
            .unwrap_or_else(|| format!("http://{}:{}/media", addr, port));

        Ok(Self {
            port,
            access_token_secret,
            store,
            redis_url: var("REDIS_URL").unwrap_or_else(|| String::from("redis://127.0.0.1/")),
            upload_dir: PathBuf::from(var("UPLOAD_DIR").unwrap_or_else(|| String::from("./uploads"))),
            cors_origin: var("CORS_ORIGIN"),
            media_dir: PathBuf::from(var("MEDIA_DIR").unwrap_or_else(|| String::from("./media"))),
            media_base_url,
            s3_bucket: var("S3_BUCKET"),
            s3_public_url: var("S3_PUBLIC_URL"),
            addr,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }

    pub fn require_s3_bucket(&self) -> Result<&str, ConfigError> {
        self.s3_bucket
            .as_deref()
            .ok_or(ConfigError::Missing("S3_BUCKET"))
    }
}
