//! Repair Record Service - Main Entry Point

use api::ApiConfig;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    api::init_logging();

    info!("=== repairlog v{} ===", env!("CARGO_PKG_VERSION"));

    let config = ApiConfig::load()?;
    let state = api::build_state(&config).await?;
    let app = api::create_router(state, &config);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received Ctrl+C, shutting down"),
        Err(e) => tracing::error!(error = %e, "failed to listen for shutdown signal"),
    }
}
