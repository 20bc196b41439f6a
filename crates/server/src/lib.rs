//! Bloglist Server Library
//!
//! REST API for users and their blog posts, with bearer-token auth.

pub mod core;
pub mod handlers;
pub mod list_helper;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub use crate::core::{AppState, RunMode, ServerConfig, Store};

/// Full application: API router plus CORS and request tracing.
pub fn app(state: AppState) -> Router {
    crate::core::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // Already set, ignore
    }

    info!("=== Bloglist Server ===");

    let config = ServerConfig::from_env()?;
    let addr = config.bind_addr();

    let store = Store::connect(&config.database_url).await?;
    let state = AppState::new(config, store.clone());
    if state.config.mode.is_test() {
        info!("Test mode: /api/testing routes enabled");
    }

    let app = app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
    }
}
