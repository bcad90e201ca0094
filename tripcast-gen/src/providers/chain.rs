//! Ordered provider fallback chain
//!
//! Tries remote providers in order under a bounded timeout, then falls back
//! to the local template generator. The template step is not a chain entry
//! that might be misconfigured away; it is a structural field, which makes
//! `generate` total. The pipeline only ever observes success; which provider
//! served the request is recorded for observability.

use super::{ContentProvider, GeneratedContent, TemplateProvider};
use crate::models::{CanonicalPreferences, TripFacts};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Content provider chain with guaranteed template fallback
pub struct ProviderChain {
    /// Remote providers, tried in order
    remotes: Vec<Arc<dyn ContentProvider>>,
    template: TemplateProvider,
    /// Outer bound on each provider attempt
    attempt_timeout: Duration,
}

impl ProviderChain {
    pub fn new(remotes: Vec<Arc<dyn ContentProvider>>, attempt_timeout: Duration) -> Self {
        Self {
            remotes,
            template: TemplateProvider::new(),
            attempt_timeout,
        }
    }

    /// A chain with no remote providers (template only)
    pub fn template_only() -> Self {
        Self::new(Vec::new(), Duration::from_secs(1))
    }

    /// Produce guide content; never fails
    ///
    /// Returns the content and the name of the provider that served it.
    pub async fn generate(
        &self,
        facts: &TripFacts,
        prefs: &CanonicalPreferences,
    ) -> (GeneratedContent, &'static str) {
        for provider in &self.remotes {
            match tokio::time::timeout(self.attempt_timeout, provider.generate(facts, prefs)).await
            {
                Ok(Ok(content)) => {
                    info!(
                        provider = provider.name(),
                        destination = %facts.destination,
                        "Content provider succeeded"
                    );
                    return (content, provider.name());
                }
                Ok(Err(e)) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "Content provider failed, trying next in chain"
                    );
                }
                Err(_) => {
                    warn!(
                        provider = provider.name(),
                        timeout_ms = self.attempt_timeout.as_millis() as u64,
                        "Content provider timed out, trying next in chain"
                    );
                }
            }
        }

        info!(
            destination = %facts.destination,
            "All remote providers exhausted, using template content"
        );
        (TemplateProvider::render(facts, prefs), self.template.name())
    }
}
