//! Shared fixtures for integration tests

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tripcast_common::events::EventBus;
use tripcast_gen::enrichment::{
    EnrichError, EnrichmentService, EventSearch, PlaceSearch, SearchFilters, WeatherLookup,
};
use tripcast_gen::jobs::GenerationManager;
use tripcast_gen::models::{
    DateRange, EnrichedItem, ItemCategory, JobSnapshot, TripFacts, WeatherDay,
};
use tripcast_gen::providers::{ContentProvider, ProviderChain};
use tripcast_gen::store::{GuideStore, MemoryGuideStore, MemoryTripStore, TripStore};
use tripcast_gen::AppState;
use uuid::Uuid;

pub fn paris_facts() -> TripFacts {
    TripFacts {
        destination: "Paris, France".to_string(),
        date_range: DateRange {
            start: NaiveDate::from_ymd_opt(2026, 9, 10).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 9, 13).unwrap(),
        },
        traveler_count: 2,
        flights: vec![],
        hotels: vec![],
    }
}

pub fn enriched_item(name: &str, category: ItemCategory, tags: &[&str]) -> EnrichedItem {
    EnrichedItem {
        name: name.to_string(),
        address: format!("{} address", name),
        category,
        rating: Some(4.4),
        price_tier: None,
        url: Some(format!("https://example.com/{}", name.replace(' ', "-"))),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        source: "mock".to_string(),
    }
}

/// Place search returning canned items, counting calls
pub struct StaticPlaces {
    pub calls: Arc<AtomicUsize>,
    pub dining: Vec<EnrichedItem>,
    pub attractions: Vec<EnrichedItem>,
    /// When set, attraction queries fail while dining still succeeds
    pub fail_attractions: bool,
}

impl StaticPlaces {
    pub fn paris() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            dining: vec![
                enriched_item("Le Comptoir", ItemCategory::Dining, &["french"]),
                enriched_item("Chez Janou", ItemCategory::Dining, &["french"]),
            ],
            attractions: vec![
                enriched_item("Musee d'Orsay", ItemCategory::Attraction, &["museums"]),
                enriched_item("Louvre", ItemCategory::Attraction, &["museums"]),
            ],
            fail_attractions: false,
        }
    }
}

#[async_trait]
impl PlaceSearch for StaticPlaces {
    async fn search(
        &self,
        category: ItemCategory,
        _destination: &str,
        _filters: &SearchFilters,
    ) -> Result<Vec<EnrichedItem>, EnrichError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match category {
            ItemCategory::Dining => Ok(self.dining.clone()),
            ItemCategory::Attraction => {
                if self.fail_attractions {
                    Err(EnrichError::Network("attraction provider down".to_string()))
                } else {
                    Ok(self.attractions.clone())
                }
            }
            ItemCategory::Event => Ok(Vec::new()),
        }
    }
}

pub struct StaticEvents {
    pub events: Vec<EnrichedItem>,
}

impl StaticEvents {
    pub fn paris() -> Self {
        Self {
            events: vec![enriched_item(
                "Seine Jazz Evening",
                ItemCategory::Event,
                &["music"],
            )],
        }
    }
}

#[async_trait]
impl EventSearch for StaticEvents {
    async fn search(
        &self,
        _destination: &str,
        _range: &DateRange,
        _filters: &SearchFilters,
    ) -> Result<Vec<EnrichedItem>, EnrichError> {
        Ok(self.events.clone())
    }
}

pub struct StaticWeather;

#[async_trait]
impl WeatherLookup for StaticWeather {
    async fn forecast(
        &self,
        _destination: &str,
        range: &DateRange,
    ) -> Result<Vec<WeatherDay>, EnrichError> {
        Ok(range
            .days()
            .into_iter()
            .map(|date| WeatherDay {
                date,
                summary: "Partly cloudy".to_string(),
                high_c: 21.0,
                low_c: 13.0,
                precipitation_chance: Some(20),
            })
            .collect())
    }
}

/// Everything needed to drive the service against in-memory collaborators
pub struct TestHarness {
    pub state: AppState,
    pub trips: Arc<MemoryTripStore>,
    pub guides: Arc<MemoryGuideStore>,
    pub manager: Arc<GenerationManager>,
    pub event_bus: EventBus,
}

pub fn harness_with(
    places: Arc<dyn PlaceSearch>,
    events: Arc<dyn EventSearch>,
    weather: Arc<dyn WeatherLookup>,
    remotes: Vec<Arc<dyn ContentProvider>>,
) -> TestHarness {
    let enrichment = Arc::new(EnrichmentService::new(
        places,
        events,
        weather,
        Duration::from_secs(60),
        Duration::from_secs(5),
    ));
    let providers = Arc::new(ProviderChain::new(remotes, Duration::from_millis(500)));

    let trips = Arc::new(MemoryTripStore::new());
    let guides = Arc::new(MemoryGuideStore::new());
    let event_bus = EventBus::new(256);

    let manager = Arc::new(GenerationManager::new(
        enrichment,
        providers,
        guides.clone() as Arc<dyn GuideStore>,
        event_bus.clone(),
    ));

    let state = AppState::new(
        trips.clone() as Arc<dyn TripStore>,
        guides.clone() as Arc<dyn GuideStore>,
        manager.clone(),
        event_bus.clone(),
    );

    TestHarness {
        state,
        trips,
        guides,
        manager,
        event_bus,
    }
}

pub fn default_harness() -> TestHarness {
    harness_with(
        Arc::new(StaticPlaces::paris()),
        Arc::new(StaticEvents::paris()),
        Arc::new(StaticWeather),
        Vec::new(),
    )
}

/// Poll the manager until the run reaches a terminal state
pub async fn wait_for_terminal(manager: &GenerationManager, trip_id: Uuid) -> JobSnapshot {
    for _ in 0..500 {
        if let Some(snapshot) = manager.status(trip_id).await {
            if snapshot.finished_at.is_some() {
                return snapshot;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("generation did not reach a terminal state in time");
}
