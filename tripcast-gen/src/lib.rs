//! tripcast-gen - Guide Generation Service
//!
//! Turns stored trip facts plus traveler preferences into an enriched,
//! personalized travel guide. Generation runs asynchronously per trip with
//! live progress over SSE and polling, at most one active run per trip id,
//! and graceful degradation when individual content providers fail.

pub mod api;
pub mod config;
pub mod db;
pub mod enrichment;
pub mod error;
pub mod jobs;
pub mod models;
pub mod normalize;
pub mod providers;
pub mod store;

pub use crate::error::{ApiError, ApiResult};

use crate::config::ServiceConfig;
use crate::enrichment::{EnrichmentService, EventsClient, PlacesClient, WeatherClient};
use crate::jobs::GenerationManager;
use crate::providers::{ContentProvider, LlmClient, ProviderChain};
use crate::store::{GuideStore, SqliteGuideStore, SqliteTripStore, TripStore};
use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tripcast_common::EventBus;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Trip facts store
    pub trips: Arc<dyn TripStore>,
    /// Guide artifact store (same instance the pipeline persists into)
    pub guides: Arc<dyn GuideStore>,
    /// Generation job manager
    pub manager: Arc<GenerationManager>,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        trips: Arc<dyn TripStore>,
        guides: Arc<dyn GuideStore>,
        manager: Arc<GenerationManager>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            trips,
            guides,
            manager,
            event_bus,
            startup_time: Utc::now(),
        }
    }
}

/// Assemble production services from resolved configuration
pub fn build_state(
    config: &ServiceConfig,
    pool: SqlitePool,
    event_bus: EventBus,
) -> anyhow::Result<AppState> {
    let places = Arc::new(PlacesClient::new(
        config.places_base_url.clone(),
        config.places_api_key.clone(),
        config.provider_timeout,
    )?);
    let events = Arc::new(EventsClient::new(
        config.events_base_url.clone(),
        config.events_api_key.clone(),
        config.provider_timeout,
    )?);
    let weather = Arc::new(WeatherClient::new(
        config.weather_base_url.clone(),
        config.provider_timeout,
    )?);

    let enrichment = Arc::new(EnrichmentService::new(
        places,
        events,
        weather,
        config.cache_ttl,
        config.provider_timeout,
    ));

    let mut remotes: Vec<Arc<dyn ContentProvider>> = Vec::new();
    if let Some(endpoint) = config.llm_primary.clone() {
        remotes.push(Arc::new(LlmClient::new(
            "primary-llm",
            endpoint,
            config.provider_timeout,
        )?));
    }
    if let Some(endpoint) = config.llm_secondary.clone() {
        remotes.push(Arc::new(LlmClient::new(
            "secondary-llm",
            endpoint,
            config.provider_timeout,
        )?));
    }
    let providers = Arc::new(ProviderChain::new(remotes, config.provider_timeout));

    let trips: Arc<dyn TripStore> = Arc::new(SqliteTripStore::new(pool.clone()));
    let guides: Arc<dyn GuideStore> = Arc::new(SqliteGuideStore::new(pool));

    let manager = Arc::new(GenerationManager::new(
        enrichment,
        providers,
        Arc::clone(&guides),
        event_bus.clone(),
    ));

    Ok(AppState::new(trips, guides, manager, event_bus))
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::trip_routes())
        .merge(api::generation_routes())
        .route("/events", get(api::event_stream))
        .route(
            "/trips/:trip_id/generation/events",
            get(api::generation_event_stream),
        )
        .merge(api::health_routes())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
