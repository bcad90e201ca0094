//! Event search API client

use super::rate_limit::RateLimiter;
use super::{EnrichError, EventSearch, SearchFilters};
use crate::models::{DateRange, EnrichedItem, ItemCategory};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

const USER_AGENT: &str = "Tripcast/0.1.0 (https://github.com/tripcast/tripcast)";
const RATE_LIMIT_MS: u64 = 250;
const RESULT_LIMIT: usize = 20;
const SOURCE: &str = "events";

/// Event search response (the subset we read)
#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    events: Vec<EventResult>,
}

#[derive(Debug, Deserialize)]
struct EventResult {
    name: String,
    #[serde(default)]
    venue: Option<EventVenue>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    classifications: Vec<String>,
    #[serde(default)]
    rating: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct EventVenue {
    #[serde(default)]
    address: Option<String>,
}

/// Event search API client
pub struct EventsClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    rate_limiter: Arc<RateLimiter>,
}

impl EventsClient {
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
}

#[async_trait]
impl EventSearch for EventsClient {
    async fn search(
        &self,
        destination: &str,
        range: &DateRange,
        filters: &SearchFilters,
    ) -> Result<Vec<EnrichedItem>, EnrichError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| EnrichError::NotConfigured("events API key missing".to_string()))?;

        self.rate_limiter.wait().await;

        let url = format!("{}/v1/events/search", self.base_url);
        let keywords = filters.interest_tags.join(",");

        tracing::debug!(
            destination = %destination,
            start = %range.start,
            end = %range.end,
            "Querying event search API"
        );

        let start_date = range.start.to_string();
        let end_date = range.end.to_string();
        let limit = RESULT_LIMIT.to_string();
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(api_key)
            .query(&[
                ("city", destination),
                ("start_date", start_date.as_str()),
                ("end_date", end_date.as_str()),
                ("keywords", keywords.as_str()),
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

        let parsed: EventsResponse = response
            .json()
            .await
            .map_err(|e| EnrichError::Parse(e.to_string()))?;

        let items = parsed
            .events
            .into_iter()
            .map(|event| EnrichedItem {
                name: event.name,
                address: event.venue.and_then(|v| v.address).unwrap_or_default(),
                category: ItemCategory::Event,
                rating: event.rating,
                price_tier: None,
                url: event.url,
                tags: event
                    .classifications
                    .into_iter()
                    .map(|c| c.to_lowercase())
                    .collect(),
                source: SOURCE.to_string(),
            })
            .collect::<Vec<_>>();

        tracing::info!(
            destination = %destination,
            count = items.len(),
            "Event search complete"
        );

        Ok(items)
    }
}
