//! Configuration loading and resolution
//!
//! Resolution priority for every setting: environment variable, then TOML
//! config file, then compiled default. API keys additionally warn when they
//! are present in more than one source, since that usually means a stale
//! deployment.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

/// One remote LLM endpoint in the content provider chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmEndpoint {
    pub base_url: String,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

/// TOML configuration for tripcast-gen
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Bind address, e.g. "127.0.0.1:6210"
    #[serde(default)]
    pub bind_address: Option<String>,

    /// SQLite database path; defaults to the platform data directory
    #[serde(default)]
    pub database_path: Option<String>,

    /// Primary LLM endpoint (first in the fallback chain)
    #[serde(default)]
    pub llm_primary: Option<LlmEndpoint>,

    /// Secondary LLM endpoint (second in the fallback chain)
    #[serde(default)]
    pub llm_secondary: Option<LlmEndpoint>,

    /// Place search API
    #[serde(default)]
    pub places_base_url: Option<String>,
    #[serde(default)]
    pub places_api_key: Option<String>,

    /// Event search API
    #[serde(default)]
    pub events_base_url: Option<String>,
    #[serde(default)]
    pub events_api_key: Option<String>,

    /// Weather forecast API (no key required for the default provider)
    #[serde(default)]
    pub weather_base_url: Option<String>,

    /// Per external call timeout in seconds
    #[serde(default)]
    pub provider_timeout_secs: Option<u64>,

    /// Enrichment cache time-to-live in seconds
    #[serde(default)]
    pub cache_ttl_secs: Option<u64>,

    /// Retention window for terminal job records in seconds
    #[serde(default)]
    pub job_retention_secs: Option<u64>,
}

impl TomlConfig {
    /// Load configuration following the resolution priority:
    /// 1. `TRIPCAST_CONFIG` environment variable (explicit path)
    /// 2. `~/.config/tripcast/tripcast.toml`
    /// 3. `/etc/tripcast/tripcast.toml` (Linux)
    /// 4. Compiled defaults (empty config)
    pub fn load() -> Self {
        let path = match config_file_path() {
            Some(p) => p,
            None => {
                info!("No TOML config file found, using defaults");
                return Self::default();
            }
        };

        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<TomlConfig>(&content) {
                Ok(config) => {
                    info!("Configuration loaded from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Failed to parse {}: {} (using defaults)", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read {}: {} (using defaults)", path.display(), e);
                Self::default()
            }
        }
    }

    /// Write configuration to a TOML file (best-effort, atomic via temp file)
    pub fn write_to(&self, path: &std::path::Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

/// Locate the configuration file, if any
fn config_file_path() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var("TRIPCAST_CONFIG") {
        let path = PathBuf::from(explicit);
        if path.exists() {
            return Some(path);
        }
        warn!("TRIPCAST_CONFIG points at a missing file: {}", path.display());
        return None;
    }

    if let Some(user_config) = dirs::config_dir().map(|d| d.join("tripcast").join("tripcast.toml"))
    {
        if user_config.exists() {
            return Some(user_config);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/tripcast/tripcast.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Default database path under the platform data directory
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("tripcast"))
        .unwrap_or_else(|| PathBuf::from("./tripcast_data"))
        .join("tripcast.db")
}

/// Resolve an API key with ENV > TOML priority
///
/// Warns when the key is present in both sources (potential misconfiguration)
/// and when it is present in neither.
pub fn resolve_api_key(
    name: &str,
    env_var: &str,
    toml_value: Option<&String>,
) -> Option<String> {
    let env_key = std::env::var(env_var).ok().filter(|k| is_valid_key(k));
    let toml_key = toml_value.filter(|k| is_valid_key(k.as_str()));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "{} API key found in both {} and TOML config. Using environment (highest priority).",
            name, env_var
        );
    }

    match (env_key, toml_key) {
        (Some(key), _) => {
            info!("{} API key loaded from environment variable", name);
            Some(key)
        }
        (None, Some(key)) => {
            info!("{} API key loaded from TOML config", name);
            Some(key.clone())
        }
        (None, None) => None,
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_keys_are_invalid() {
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   "));
        assert!(is_valid_key("sk-abc123"));
    }

    #[test]
    fn toml_round_trip() {
        let config = TomlConfig {
            bind_address: Some("127.0.0.1:6210".to_string()),
            llm_primary: Some(LlmEndpoint {
                base_url: "https://llm.example.com/v1".to_string(),
                model: "guidewriter-large".to_string(),
                api_key: Some("key".to_string()),
            }),
            cache_ttl_secs: Some(900),
            ..Default::default()
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: TomlConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.bind_address.as_deref(), Some("127.0.0.1:6210"));
        assert_eq!(parsed.llm_primary.unwrap().model, "guidewriter-large");
        assert_eq!(parsed.cache_ttl_secs, Some(900));
    }

    #[test]
    fn parses_partial_config() {
        let parsed: TomlConfig = toml::from_str("bind_address = \"0.0.0.0:8080\"").unwrap();
        assert_eq!(parsed.bind_address.as_deref(), Some("0.0.0.0:8080"));
        assert!(parsed.llm_primary.is_none());
        assert!(parsed.job_retention_secs.is_none());
    }
}
