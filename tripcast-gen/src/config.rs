//! Configuration resolution for tripcast-gen
//!
//! Turns the raw TOML config into a fully-resolved ServiceConfig: every
//! setting gets its compiled default, API keys are resolved with ENV > TOML
//! priority, and durations become std types.

use std::path::PathBuf;
use std::time::Duration;
use tripcast_common::config::{self, LlmEndpoint, TomlConfig};

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:6210";
const DEFAULT_PLACES_BASE_URL: &str = "https://api.geoplaces.io";
const DEFAULT_EVENTS_BASE_URL: &str = "https://api.cityevents.io";
const DEFAULT_WEATHER_BASE_URL: &str = "https://api.weatherhub.io";
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 20;
const DEFAULT_CACHE_TTL_SECS: u64 = 900;
const DEFAULT_JOB_RETENTION_SECS: u64 = 3600;

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_address: String,
    pub database_path: PathBuf,
    pub llm_primary: Option<LlmEndpoint>,
    pub llm_secondary: Option<LlmEndpoint>,
    pub places_base_url: String,
    pub places_api_key: Option<String>,
    pub events_base_url: String,
    pub events_api_key: Option<String>,
    pub weather_base_url: String,
    pub provider_timeout: Duration,
    pub cache_ttl: Duration,
    pub job_retention: Duration,
}

impl ServiceConfig {
    /// Resolve from TOML config + environment
    pub fn resolve(toml: &TomlConfig) -> Self {
        let bind_address = std::env::var("TRIPCAST_BIND_ADDRESS")
            .ok()
            .or_else(|| toml.bind_address.clone())
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let database_path = std::env::var("TRIPCAST_DB_PATH")
            .ok()
            .or_else(|| toml.database_path.clone())
            .map(PathBuf::from)
            .unwrap_or_else(config::default_database_path);

        let llm_primary = resolve_endpoint(toml.llm_primary.clone(), "TRIPCAST_LLM_API_KEY", "primary LLM");
        let llm_secondary =
            resolve_endpoint(toml.llm_secondary.clone(), "TRIPCAST_LLM2_API_KEY", "secondary LLM");

        Self {
            bind_address,
            database_path,
            llm_primary,
            llm_secondary,
            places_base_url: toml
                .places_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_PLACES_BASE_URL.to_string()),
            places_api_key: config::resolve_api_key(
                "places",
                "TRIPCAST_PLACES_API_KEY",
                toml.places_api_key.as_ref(),
            ),
            events_base_url: toml
                .events_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_EVENTS_BASE_URL.to_string()),
            events_api_key: config::resolve_api_key(
                "events",
                "TRIPCAST_EVENTS_API_KEY",
                toml.events_api_key.as_ref(),
            ),
            weather_base_url: toml
                .weather_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_WEATHER_BASE_URL.to_string()),
            provider_timeout: Duration::from_secs(
                toml.provider_timeout_secs
                    .unwrap_or(DEFAULT_PROVIDER_TIMEOUT_SECS),
            ),
            cache_ttl: Duration::from_secs(toml.cache_ttl_secs.unwrap_or(DEFAULT_CACHE_TTL_SECS)),
            job_retention: Duration::from_secs(
                toml.job_retention_secs.unwrap_or(DEFAULT_JOB_RETENTION_SECS),
            ),
        }
    }
}

/// Apply the ENV > TOML key priority to an LLM endpoint
///
/// An endpoint with no resolvable key is kept (some deployments run keyless
/// gateways); an absent endpoint stays absent.
fn resolve_endpoint(
    endpoint: Option<LlmEndpoint>,
    env_var: &str,
    name: &str,
) -> Option<LlmEndpoint> {
    endpoint.map(|mut ep| {
        ep.api_key = config::resolve_api_key(name, env_var, ep.api_key.as_ref());
        ep
    })
}
