//! Weather forecast API client
//!
//! The default provider needs no API key. Forecasts past the provider's
//! horizon come back as an empty day list, which the pipeline treats the
//! same as a degraded lookup.

use super::rate_limit::RateLimiter;
use super::{EnrichError, WeatherLookup};
use crate::models::{DateRange, WeatherDay};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

const USER_AGENT: &str = "Tripcast/0.1.0 (https://github.com/tripcast/tripcast)";
const RATE_LIMIT_MS: u64 = 250;

/// Daily forecast response (the subset we read)
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    days: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
struct ForecastDay {
    date: chrono::NaiveDate,
    #[serde(default)]
    conditions: Option<String>,
    temp_max_c: f32,
    temp_min_c: f32,
    #[serde(default)]
    precip_probability: Option<u8>,
}

/// Weather forecast API client
pub struct WeatherClient {
    http_client: reqwest::Client,
    base_url: String,
    rate_limiter: Arc<RateLimiter>,
}

impl WeatherClient {
    pub fn new(base_url: String, call_timeout: Duration) -> Result<Self, EnrichError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(call_timeout)
            .build()
            .map_err(|e| EnrichError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limiter: Arc::new(RateLimiter::new(RATE_LIMIT_MS)),
        })
    }
}

#[async_trait]
impl WeatherLookup for WeatherClient {
    async fn forecast(
        &self,
        destination: &str,
        range: &DateRange,
    ) -> Result<Vec<WeatherDay>, EnrichError> {
        self.rate_limiter.wait().await;

        let url = format!("{}/v1/forecast/daily", self.base_url);

        tracing::debug!(
            destination = %destination,
            start = %range.start,
            end = %range.end,
            "Querying weather API"
        );

        let start = range.start.to_string();
        let end = range.end.to_string();
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("location", destination),
                ("start", start.as_str()),
                ("end", end.as_str()),
            ])
            .send()
            .await
            .map_err(|e| EnrichError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EnrichError::Api(status.as_u16(), error_text));
        }

        let parsed: ForecastResponse = response
            .json()
            .await
            .map_err(|e| EnrichError::Parse(e.to_string()))?;

        let days = parsed
            .days
            .into_iter()
            .map(|day| WeatherDay {
                date: day.date,
                summary: day.conditions.unwrap_or_else(|| "Unknown".to_string()),
                high_c: day.temp_max_c,
                low_c: day.temp_min_c,
                precipitation_chance: day.precip_probability,
            })
            .collect::<Vec<_>>();

        tracing::info!(
            destination = %destination,
            count = days.len(),
            "Weather forecast retrieved"
        );

        Ok(days)
    }
}
