//! Monolith Binary - single-server deployment
//!
//! Wires up:
//! - the document store (Redis, or in-memory with `STORE=memory`)
//! - filesystem media storage, served back under `/media`
//! - the `/api/v1` HTTP adapter

use reelbase::adapters::http::{cors_layer, router, AppState, SharedStore};
use reelbase::adapters::jwt::JwtResolver;
use reelbase::adapters::local::FsMediaStorage;
use reelbase::adapters::memory::MemoryStore;
use reelbase::adapters::redis::RedisPool;
use reelbase::config::{ServerConfig, StoreKind};
use std::process;
use std::sync::Arc;
use tower_http::services::ServeDir;
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

    // 1. Document store
    let store: SharedStore = match config.store {
        StoreKind::Redis => match RedisPool::new(&config.redis_url) {
            Ok(pool) => Arc::new(pool),
            Err(e) => {
                tracing::error!(error = %e, "failed to connect to Redis");
                process::exit(1);
            }
        },
        StoreKind::Memory => {
            tracing::warn!("using in-memory store, data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    // 2. Media storage
    if let Err(e) = tokio::fs::create_dir_all(&config.media_dir).await {
        tracing::error!(error = %e, dir = %config.media_dir.display(), "cannot create media dir");
        process::exit(1);
    }
    let media = Arc::new(FsMediaStorage::new(
        config.media_dir.clone(),
        &config.media_base_url,
    ));

    // 3. HTTP layer
    let state = AppState {
        auth: Arc::new(JwtResolver::new(store.clone(), &config.access_token_secret)),
        store,
        media,
        upload_dir: config.upload_dir.clone(),
    };
    let app = router(state)
        .nest_service("/media", ServeDir::new(&config.media_dir))
        .layer(cors_layer(config.cors_origin.as_deref()));

    // 4. Start Server
    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .expect("Failed to bind TCP listener");
    tracing::info!(addr = %config.bind_addr(), "listening");
    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
