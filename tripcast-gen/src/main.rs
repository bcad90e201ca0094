//! tripcast-gen - Guide Generation Service
//!
//! Coordinates LLM content generation and place/event/weather enrichment
//! into per-trip travel guides, with live progress over HTTP REST + SSE.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tripcast_common::config::TomlConfig;
use tripcast_common::events::EventBus;

use tripcast_gen::config::ServiceConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (RUST_LOG overrides the default level)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting tripcast-gen (Guide Generation) service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Resolve configuration: ENV > TOML > defaults
    let toml_config = TomlConfig::load();
    let config = ServiceConfig::resolve(&toml_config);
    info!("Database: {}", config.database_path.display());

    // Initialize database connection pool
    let db_pool = tripcast_gen::db::init_database_pool(&config.database_path).await?;
    info!("Database connection established");

    // Create event bus for SSE broadcasting
    let event_bus = EventBus::new(256);
    info!("Event bus initialized");

    // Create application state (stores, enrichment, provider chain, manager)
    let state = tripcast_gen::build_state(&config, db_pool, event_bus)?;

    // Periodic sweep of terminal job records past the retention window
    let manager = state.manager.clone();
    let retention = config.job_retention;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            interval.tick().await;
            manager.prune_finished(retention).await;
        }
    });

    // Build router
    let app = tripcast_gen::build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Listening on http://{}", config.bind_address);
    info!("Health check: http://{}/health", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
