//! Repair Record API Server
//!
//! REST boundary for the repair record application: multipart upload,
//! listing, deletion, CSV download, plus static serving of the front-end
//! and the uploaded photos.

use axum::routing::{delete, get, post};
use axum::Router;
use lifecycle::RecordLifecycle;
use std::sync::Arc;
use storage::{JsonFileStore, RecordStore, SqliteStore};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

pub mod config;
mod error;
mod routes;

pub use crate::config::{ApiConfig, StoreBackend, StoreConfig};
pub use error::ApiError;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub lifecycle: Arc<RecordLifecycle>,
}

/// Open the configured record store backend.
pub async fn open_store(config: &ApiConfig) -> anyhow::Result<Arc<dyn RecordStore>> {
    let store: Arc<dyn RecordStore> = match config.store.backend {
        StoreBackend::Json => Arc::new(JsonFileStore::new(&config.store.json_path)),
        StoreBackend::Sqlite => Arc::new(SqliteStore::open(&config.store.sqlite_url).await?),
    };
    Ok(store)
}

/// Wire the application state from configuration: open the record store and
/// the uploads directory, then hand both to the lifecycle manager.
pub async fn build_state(config: &ApiConfig) -> anyhow::Result<AppState> {
    let store = open_store(config).await?;
    let assets = assets::AssetStore::open(&config.uploads_dir)?;
    info!(uploads = %config.uploads_dir.display(), "asset store ready");

    Ok(AppState {
        lifecycle: Arc::new(RecordLifecycle::new(store, assets)),
    })
}

/// Create the application router
pub fn create_router(state: AppState, config: &ApiConfig) -> Router {
    Router::new()
        .route("/upload", post(routes::records::upload))
        .route("/reparaciones", get(routes::records::list))
        .route("/reparaciones/:id", delete(routes::records::remove))
        .route("/download-csv", get(routes::export::download_csv))
        .nest_service("/uploads", ServeDir::new(&config.uploads_dir))
        .fallback_service(ServeDir::new(&config.public_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}
