//! AWS API Binary
//!
//! Same HTTP surface as the monolith, with media objects kept in S3.
//!
//! Environment Variables:
//! - AWS_REGION: AWS region (e.g., us-east-1)
//! - S3_BUCKET: S3 bucket for media objects
//! - S3_PUBLIC_URL: public base URL of the bucket (defaults to the S3 endpoint)
//! - REDIS_URL, ACCESS_TOKEN_SECRET, ADDR, PORT: as for the monolith

use reelbase::adapters::aws::S3MediaStorage;
use reelbase::adapters::http::{cors_layer, router, AppState};
use reelbase::adapters::jwt::JwtResolver;
use reelbase::adapters::redis::RedisPool;
use reelbase::config::ServerConfig;
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("reelbase=info,tower_http=info")),
        )
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            process::exit(1);
        }
    };
    let bucket = match config.require_s3_bucket() {
        Ok(bucket) => bucket.to_string(),
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            process::exit(1);
        }
    };

    // Load AWS config
    let aws = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let region = aws
        .region()
        .map(|r| r.to_string())
        .unwrap_or_else(|| String::from("us-east-1"));
    let public_url = config
        .s3_public_url
        .clone()
        .unwrap_or_else(|| format!("https://{}.s3.{}.amazonaws.com", bucket, region));
    let media = Arc::new(S3MediaStorage::new(
        aws_sdk_s3::Client::new(&aws),
        bucket,
        public_url,
    ));

    let store = match RedisPool::new(&config.redis_url) {
        Ok(pool) => Arc::new(pool),
        Err(e) => {
            tracing::error!(error = %e, "failed to connect to Redis");
            process::exit(1);
        }
    };

    let state = AppState {
        auth: Arc::new(JwtResolver::new(store.clone(), &config.access_token_secret)),
        store,
        media,
        upload_dir: config.upload_dir.clone(),
    };
    let app = router(state).layer(cors_layer(config.cors_origin.as_deref()));

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .expect("Failed to bind TCP listener");
    tracing::info!(addr = %config.bind_addr(), "listening");
    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
