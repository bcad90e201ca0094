//! Content provider abstraction
//!
//! Narrative guide sections (summary, destination insights, day-by-day
//! text) are produced by interchangeable providers behind one capability
//! trait. An ordered fallback chain tries remote LLM providers first and
//! always lands on the local template generator, so content generation as a
//! whole never fails.

pub mod chain;
pub mod llm;
pub mod template;

pub use chain::ProviderChain;
pub use llm::LlmClient;
pub use template::TemplateProvider;

use crate::models::{CanonicalPreferences, Citation, TripFacts};
use async_trait::async_trait;
use thiserror::Error;

/// Content provider errors
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Provider API returned an error response
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Failed to parse the provider response
    #[error("Parse error: {0}")]
    Parse(String),

    /// Provider is not configured (missing endpoint or key)
    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

/// Narrative sections produced by a content provider
#[derive(Debug, Clone)]
pub struct GeneratedContent {
    /// Trip summary paragraph
    pub summary: String,
    /// Destination insights (short standalone tips)
    pub insights: Vec<String>,
    /// One note per itinerary day, in day order
    pub day_notes: Vec<String>,
    pub citations: Vec<Citation>,
}

/// A single content generator in the fallback chain
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Provider identifier recorded for observability (e.g. "primary-llm")
    fn name(&self) -> &'static str;

    /// Produce narrative sections from trip facts and preferences
    async fn generate(
        &self,
        facts: &TripFacts,
        prefs: &CanonicalPreferences,
    ) -> Result<GeneratedContent, ProviderError>;
}
