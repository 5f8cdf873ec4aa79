// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_loader::SystemClock;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::http_repository::HttpSnapshotRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    current_dashboard, get_dashboard, health_check, list_domains, list_periods, recently_played,
    watch_dashboard,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_app_config()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(HttpSnapshotRepository::new(config.store.timeout_secs)?);

    // Create one loader per dashboard domain (application layer)
    let state = Arc::new(AppState::from_config(
        &config,
        repository,
        Arc::new(SystemClock),
    ));
    tracing::info!("Configured dashboards: {:?}", state.dashboards.keys().collect::<Vec<_>>());

    // Build router (presentation layer)
    // Responses are compressed per request in the handlers, so no CompressionLayer here
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/domains", get(list_domains))
        .route("/dashboards/:domain", get(get_dashboard))
        .route("/dashboards/:domain/current", get(current_dashboard))
        .route("/dashboards/:domain/watch", get(watch_dashboard))
        .route("/dashboards/:domain/periods", get(list_periods))
        .route("/dashboards/:domain/recently-played", get(recently_played))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Starting personal-data-dashboard on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
