pub mod auth;
pub mod config;
pub mod create;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod sanitize;
pub mod upload;

use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use config::ServerConfig;
use folio_storage::{InMemoryStore, PersistentStore, Storage};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use upload::{ImageUploader, LinkUploader};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Storage>,
    pub uploader: Arc<dyn ImageUploader>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Storage>, config: ServerConfig) -> Self {
        Self {
            store,
            uploader: Arc::new(LinkUploader),
            config: Arc::new(config),
        }
    }

    pub fn with_uploader(mut self, uploader: Arc<dyn ImageUploader>) -> Self {
        self.uploader = uploader;
        self
    }
}

/// Opens the configured store. A `data_dir` that cannot be opened is an error,
/// never a silent switch to memory.
pub fn open_store(config: &ServerConfig) -> anyhow::Result<Arc<dyn Storage>> {
    match &config.data_dir {
        Some(dir) => {
            let store = PersistentStore::open(dir.clone())
                .with_context(|| format!("opening data dir {}", dir.display()))?;
            Ok(Arc::new(store))
        }
        None => {
            warn!("DATA_DIR not set, documents are kept in memory only");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}

pub fn app(state: AppState) -> Router {
    metrics::init();
    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route("/api/v1/:kind/list", get(handlers::list))
        .route("/api/v1/:kind/new", post(handlers::create))
        .route("/api/v1/:kind/:title", get(handlers::detail))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
