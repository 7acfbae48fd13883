mod config;

use std::sync::Arc;

use tracing::{info, warn};

use waypoint_api::routes;
use waypoint_api::state::{AppState, AppStateInner};
use waypoint_api::storage::Storage;
use waypoint_db::Database;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Config (also loads .env if present)
    let config = Config::from_env()?;

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "waypoint=debug,tower_http=debug".into()),
        )
        .init();

    // Init database and photo storage
    let db = Database::open(&config.db_path)?;
    let storage = Storage::new(config.upload_dir.clone()).await?;

    let state: AppState = Arc::new(AppStateInner {
        db,
        storage,
        jwt_secret: config.jwt_secret.clone(),
        token_ttl: config.token_ttl,
    });

    let app = routes::router(state, config.max_upload_bytes);

    info!("Waypoint server listening on {}", config.bind_address);
    info!("Max request body: {} bytes", config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
