//! Place/business search API client
//!
//! Serves both dining and attraction enrichment. Requests are rate limited
//! and bounded by a timeout; the service layer treats any error here as a
//! degraded category, never a pipeline failure.

use super::rate_limit::RateLimiter;
use super::{EnrichError, PlaceSearch, SearchFilters};
use crate::models::{EnrichedItem, ItemCategory, PriceTier};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

const USER_AGENT: &str = "Tripcast/0.1.0 (https://github.com/tripcast/tripcast)";
const RATE_LIMIT_MS: u64 = 250;
const RESULT_LIMIT: usize = 20;
const SOURCE: &str = "places";

/// Place search response (the subset we read)
#[derive(Debug, Deserialize)]
struct PlacesResponse {
    #[serde(default)]
    results: Vec<PlaceResult>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    name: String,
    #[serde(default)]
    location: Option<PlaceLocation>,
    #[serde(default)]
    categories: Vec<PlaceCategory>,
    #[serde(default)]
    rating: Option<f32>,
    #[serde(default)]
    website: Option<String>,
    /// 1 (cheapest) to 4 (most expensive)
    #[serde(default)]
    price: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct PlaceLocation {
    #[serde(default)]
    formatted_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceCategory {
    name: String,
}

/// Place search API client
pub struct PlacesClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    rate_limiter: Arc<RateLimiter>,
}

impl PlacesClient {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        call_timeout: Duration,
    ) -> Result<Self, EnrichError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(call_timeout)
            .build()
            .map_err(|e| EnrichError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            rate_limiter: Arc::new(RateLimiter::new(RATE_LIMIT_MS)),
        })
    }

    /// Search term for a category, narrowed by the active filters
    fn query_for(category: ItemCategory, filters: &SearchFilters) -> String {
        match category {
            ItemCategory::Dining => {
                if filters.cuisines.is_empty() {
                    "restaurant".to_string()
                } else {
                    format!("{} restaurant", filters.cuisines.join(" "))
                }
            }
            ItemCategory::Attraction => {
                if filters.interest_tags.is_empty() {
                    "attractions".to_string()
                } else {
                    filters.interest_tags.join(" ")
                }
            }
            // Events are served by the events API, not place search
            ItemCategory::Event => "events".to_string(),
        }
    }

    fn price_to_tier(price: u8) -> PriceTier {
        match price {
            0 | 1 => PriceTier::Budget,
            2 => PriceTier::Moderate,
            3 => PriceTier::Upscale,
            _ => PriceTier::Luxury,
        }
    }
}

#[async_trait]
impl PlaceSearch for PlacesClient {
    async fn search(
        &self,
        category: ItemCategory,
        destination: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<EnrichedItem>, EnrichError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| EnrichError::NotConfigured("places API key missing".to_string()))?;

        self.rate_limiter.wait().await;

        let url = format!("{}/v1/places/search", self.base_url);
        let query = Self::query_for(category, filters);

        tracing::debug!(
            category = %category,
            destination = %destination,
            query = %query,
            "Querying place search API"
        );

        let limit = RESULT_LIMIT.to_string();
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(api_key)
            .query(&[
                ("query", query.as_str()),
                ("near", destination),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| EnrichError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EnrichError::Api(status.as_u16(), error_text));
        }

        let parsed: PlacesResponse = response
            .json()
            .await
            .map_err(|e| EnrichError::Parse(e.to_string()))?;

        let items = parsed
            .results
            .into_iter()
            .map(|place| EnrichedItem {
                name: place.name,
                address: place
                    .location
                    .and_then(|l| l.formatted_address)
                    .unwrap_or_default(),
                category,
                rating: place.rating,
                price_tier: place.price.map(Self::price_to_tier),
                url: place.website,
                tags: place
                    .categories
                    .into_iter()
                    .map(|c| c.name.to_lowercase())
                    .collect(),
                source: SOURCE.to_string(),
            })
            .collect::<Vec<_>>();

        tracing::info!(
            category = %category,
            destination = %destination,
            count = items.len(),
            "Place search complete"
        );

        Ok(items)
    }
}
