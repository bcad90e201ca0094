//! Deterministic template content generator
//!
//! The guaranteed last link of the provider chain: pure local computation,
//! same input always produces the same output, never fails. Content quality
//! is intentionally modest; its job is to keep generation total when every
//! remote provider is down.

use super::{ContentProvider, GeneratedContent, ProviderError};
use crate::models::{CanonicalPreferences, Citation, Pace, TripFacts};
use async_trait::async_trait;

/// Local template-based provider
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateProvider;

impl TemplateProvider {
    pub fn new() -> Self {
        Self
    }

    /// Render guide sections; infallible by construction
    pub fn render(facts: &TripFacts, prefs: &CanonicalPreferences) -> GeneratedContent {
        let days = facts.date_range.len_days();
        let tags: Vec<String> = prefs.interest_tags().into_iter().collect();

        let pace_phrase = match prefs.pace {
            Pace::Relaxed => "an unhurried",
            Pace::Balanced => "a well-balanced",
            Pace::Packed => "an action-packed",
        };

        let focus = if tags.is_empty() {
            "the city's signature sights".to_string()
        } else {
            tags.join(", ")
        };

        let summary = format!(
            "{days} days in {destination}: {pace} itinerary for {count} traveler(s), \
             built around {focus}.",
            days = days,
            destination = facts.destination,
            pace = pace_phrase,
            count = facts.traveler_count,
            focus = focus,
        );

        let mut insights = vec![
            format!(
                "Book popular spots in {} a few days ahead, especially for evenings.",
                facts.destination
            ),
            "Keep one block per day unplanned for wandering.".to_string(),
        ];
        if !prefs.cuisines.is_empty() {
            let cuisines: Vec<String> = prefs.cuisines.iter().cloned().collect();
            insights.push(format!(
                "Local picks lean toward {} cooking per your preferences.",
                cuisines.join(" and ")
            ));
        }

        let day_notes = (0..days)
            .map(|index| match index {
                0 => format!("Arrive and settle in; an easy first look at {}.", facts.destination),
                i if i + 1 == days => "Final morning: revisit a favorite, then depart.".to_string(),
                _ => format!("Day {}: a full day following your interests.", index + 1),
            })
            .collect();

        GeneratedContent {
            summary,
            insights,
            day_notes,
            citations: vec![Citation {
                title: format!("Template guide text for {}", facts.destination),
                url: None,
                source: "template".to_string(),
            }],
        }
    }
}

#[async_trait]
impl ContentProvider for TemplateProvider {
    fn name(&self) -> &'static str {
        "template"
    }

    async fn generate(
        &self,
        facts: &TripFacts,
        prefs: &CanonicalPreferences,
    ) -> Result<GeneratedContent, ProviderError> {
        Ok(Self::render(facts, prefs))
    }
}
