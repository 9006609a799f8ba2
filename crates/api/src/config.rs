//! Service Configuration

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Top-level service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Socket address to bind
    pub bind_addr: String,
    /// Directory served as the front-end
    pub public_dir: PathBuf,
    /// Directory holding uploaded photos
    pub uploads_dir: PathBuf,
    /// Record store backend selection
    pub store: StoreConfig,
}

/// Record store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Document file for the `json` backend
    pub json_path: PathBuf,
    /// Connection URL for the `sqlite` backend
    pub sqlite_url: String,
}

/// Available record store backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Json,
    Sqlite,
}

impl ApiConfig {
    /// Load configuration: defaults, overridden by an optional
    /// `repairlog.toml`, overridden by `REPAIRLOG_*` environment variables
    /// (nested keys use `__`, e.g. `REPAIRLOG_STORE__BACKEND=sqlite`).
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("bind_addr", "0.0.0.0:3000")?
            .set_default("public_dir", "public")?
            .set_default("uploads_dir", "uploads")?
            .set_default("store.backend", "json")?
            .set_default("store.json_path", "db.json")?
            .set_default("store.sqlite_url", "sqlite://repairs.db?mode=rwc")?
            .add_source(File::with_name("repairlog").required(false))
            .add_source(Environment::with_prefix("REPAIRLOG").separator("__"))
            .build()?
            .try_deserialize()
    }
}
