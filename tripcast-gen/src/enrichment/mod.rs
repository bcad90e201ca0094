//! Enrichment service
//!
//! Converts canonical preferences plus a destination into concrete
//! EnrichedItem collections per category (dining, attractions, events) and
//! weather-by-day data. Results are filtered by preference constraints,
//! deduplicated by name+address, and cached with a TTL so iterative
//! preference tweaking does not re-hit external providers. A failing
//! category degrades to an empty collection with a recorded warning and
//! never blocks the other categories.

pub mod cache;
pub mod events_client;
pub mod places_client;
pub mod rate_limit;
pub mod weather_client;

pub use events_client::EventsClient;
pub use places_client::PlacesClient;
pub use weather_client::WeatherClient;

use crate::models::{CanonicalPreferences, DateRange, EnrichedItem, ItemCategory, PriceTier, WeatherDay};
use async_trait::async_trait;
use cache::TtlCache;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Enrichment provider errors
#[derive(Debug, Error)]
pub enum EnrichError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Provider API returned an error response
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Failed to parse the provider response
    #[error("Parse error: {0}")]
    Parse(String),

    /// Provider is not configured
    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Query constraints derived from canonical preferences
///
/// Computed once per run in the preference-application stage and reused for
/// every category query.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub cuisines: Vec<String>,
    pub price_tiers: Vec<PriceTier>,
    pub interest_tags: Vec<String>,
}

impl SearchFilters {
    pub fn from_preferences(prefs: &CanonicalPreferences) -> Self {
        Self {
            cuisines: prefs.cuisines.iter().cloned().collect(),
            price_tiers: prefs.price_tiers.iter().copied().collect(),
            interest_tags: prefs.interest_tags().into_iter().collect(),
        }
    }
}

/// Place/business search capability (dining and attractions)
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    async fn search(
        &self,
        category: ItemCategory,
        destination: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<EnrichedItem>, EnrichError>;
}

/// Local event search capability
#[async_trait]
pub trait EventSearch: Send + Sync {
    async fn search(
        &self,
        destination: &str,
        range: &DateRange,
        filters: &SearchFilters,
    ) -> Result<Vec<EnrichedItem>, EnrichError>;
}

/// Weather forecast capability
#[async_trait]
pub trait WeatherLookup: Send + Sync {
    async fn forecast(
        &self,
        destination: &str,
        range: &DateRange,
    ) -> Result<Vec<WeatherDay>, EnrichError>;
}

/// Result of enriching one category
#[derive(Debug, Clone, Default)]
pub struct CategoryResult {
    pub items: Vec<EnrichedItem>,
    /// Set when the category degraded to empty
    pub warning: Option<String>,
}

/// Result of the weather lookup
#[derive(Debug, Clone, Default)]
pub struct WeatherResult {
    pub days: Vec<WeatherDay>,
    pub warning: Option<String>,
}

/// Cache key for enriched categories
///
/// Events and weather include the trip window since their results are
/// date-dependent; dining and attraction queries are not.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ItemKey {
    category: ItemCategory,
    destination: String,
    window: Option<(NaiveDate, NaiveDate)>,
    pref_digest: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct WeatherKey {
    destination: String,
    window: (NaiveDate, NaiveDate),
}

/// Enrichment service with per-category providers and a shared TTL cache
pub struct EnrichmentService {
    places: Arc<dyn PlaceSearch>,
    events: Arc<dyn EventSearch>,
    weather: Arc<dyn WeatherLookup>,
    item_cache: TtlCache<ItemKey, Vec<EnrichedItem>>,
    weather_cache: TtlCache<WeatherKey, Vec<WeatherDay>>,
    /// Outer bound on each provider call
    call_timeout: Duration,
}

impl EnrichmentService {
    pub fn new(
        places: Arc<dyn PlaceSearch>,
        events: Arc<dyn EventSearch>,
        weather: Arc<dyn WeatherLookup>,
        cache_ttl: Duration,
        call_timeout: Duration,
    ) -> Self {
        Self {
            places,
            events,
            weather,
            item_cache: TtlCache::new(cache_ttl),
            weather_cache: TtlCache::new(cache_ttl),
            call_timeout,
        }
    }

    /// Enrich one category for a destination
    ///
    /// Never returns an error: provider failure degrades to an empty item
    /// list with a warning for the job record.
    pub async fn enrich(
        &self,
        category: ItemCategory,
        destination: &str,
        range: &DateRange,
        prefs: &CanonicalPreferences,
    ) -> CategoryResult {
        let filters = SearchFilters::from_preferences(prefs);
        let key = ItemKey {
            category,
            destination: destination.to_lowercase(),
            window: matches!(category, ItemCategory::Event)
                .then_some((range.start, range.end)),
            pref_digest: prefs.digest(),
        };

        if let Some(items) = self.item_cache.get(&key).await {
            debug!(
                category = %category,
                destination = %destination,
                count = items.len(),
                "Enrichment cache hit"
            );
            return CategoryResult {
                items,
                warning: None,
            };
        }

        let query = match category {
            ItemCategory::Dining | ItemCategory::Attraction => {
                tokio::time::timeout(
                    self.call_timeout,
                    self.places.search(category, destination, &filters),
                )
                .await
            }
            ItemCategory::Event => {
                tokio::time::timeout(
                    self.call_timeout,
                    self.events.search(destination, range, &filters),
                )
                .await
            }
        };

        match query {
            Ok(Ok(raw_items)) => {
                let items = select_items(raw_items, category, &filters);
                debug!(
                    category = %category,
                    destination = %destination,
                    count = items.len(),
                    "Enrichment query complete"
                );
                self.item_cache.insert(key, items.clone()).await;
                CategoryResult {
                    items,
                    warning: None,
                }
            }
            Ok(Err(e)) => {
                warn!(
                    category = %category,
                    destination = %destination,
                    error = %e,
                    "Enrichment provider failed, degrading to empty category"
                );
                CategoryResult {
                    items: Vec::new(),
                    warning: Some(format!("No {} suggestions could be fetched", category)),
                }
            }
            Err(_) => {
                warn!(
                    category = %category,
                    destination = %destination,
                    timeout_ms = self.call_timeout.as_millis() as u64,
                    "Enrichment provider timed out, degrading to empty category"
                );
                CategoryResult {
                    items: Vec::new(),
                    warning: Some(format!("No {} suggestions could be fetched", category)),
                }
            }
        }
    }

    /// Fetch the day-by-day forecast for the trip window
    pub async fn weather_for(&self, destination: &str, range: &DateRange) -> WeatherResult {
        let key = WeatherKey {
            destination: destination.to_lowercase(),
            window: (range.start, range.end),
        };

        if let Some(days) = self.weather_cache.get(&key).await {
            debug!(destination = %destination, "Weather cache hit");
            return WeatherResult {
                days,
                warning: None,
            };
        }

        match tokio::time::timeout(self.call_timeout, self.weather.forecast(destination, range))
            .await
        {
            Ok(Ok(days)) => {
                self.weather_cache.insert(key, days.clone()).await;
                WeatherResult {
                    days,
                    warning: None,
                }
            }
            Ok(Err(e)) => {
                warn!(
                    destination = %destination,
                    error = %e,
                    "Weather provider failed, continuing without forecast"
                );
                WeatherResult {
                    days: Vec::new(),
                    warning: Some("Weather forecast unavailable".to_string()),
                }
            }
            Err(_) => {
                warn!(
                    destination = %destination,
                    "Weather provider timed out, continuing without forecast"
                );
                WeatherResult {
                    days: Vec::new(),
                    warning: Some("Weather forecast unavailable".to_string()),
                }
            }
        }
    }
}

/// Filter, rank, and deduplicate raw provider items
///
/// Constraint handling: an item carrying metadata that contradicts the
/// filters is dropped; an item with no metadata for a constraint is kept.
/// Items matching an interest tag sort ahead of the rest, then by rating.
fn select_items(
    raw: Vec<EnrichedItem>,
    category: ItemCategory,
    filters: &SearchFilters,
) -> Vec<EnrichedItem> {
    let mut items: Vec<EnrichedItem> = raw
        .into_iter()
        .filter(|item| match category {
            ItemCategory::Dining => {
                let tier_ok = match item.price_tier {
                    Some(tier) => {
                        filters.price_tiers.is_empty() || filters.price_tiers.contains(&tier)
                    }
                    None => true,
                };
                let cuisine_ok = filters.cuisines.is_empty()
                    || item.tags.is_empty()
                    || filters.cuisines.iter().any(|c| item.has_tag(c));
                tier_ok && cuisine_ok
            }
            ItemCategory::Attraction | ItemCategory::Event => {
                filters.interest_tags.is_empty()
                    || item.tags.is_empty()
                    || filters.interest_tags.iter().any(|t| item.has_tag(t))
            }
        })
        .collect();

    items.sort_by(|a, b| {
        let a_match = filters.interest_tags.iter().any(|t| a.has_tag(t));
        let b_match = filters.interest_tags.iter().any(|t| b.has_tag(t));
        b_match
            .cmp(&a_match)
            .then_with(|| {
                b.rating
                    .unwrap_or(0.0)
                    .partial_cmp(&a.rating.unwrap_or(0.0))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    });

    let mut seen = HashSet::new();
    items.retain(|item| seen.insert(item.dedup_key()));
    items
}
