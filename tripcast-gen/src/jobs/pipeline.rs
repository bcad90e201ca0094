//! Staged generation pipeline
//!
//! Fixed stage order: preference application, dining enrichment, attraction
//! enrichment, event enrichment, weather lookup, itinerary assembly,
//! finalization. Every stage boundary re-validates the run identity against
//! the job record; a mismatch means the run was superseded and the task
//! winds down silently. Enrichment failures degrade to empty collections
//! with warnings; only assembly and persistence failures end the run in the
//! error state.

use super::{assembler, GenerationManager, Superseded};
use crate::enrichment::SearchFilters;
use crate::models::{CanonicalPreferences, GenerationStage, ItemCategory, TripFacts};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Entry point for the spawned pipeline task
pub(crate) async fn run_pipeline(
    manager: Arc<GenerationManager>,
    trip_id: Uuid,
    run: u64,
    facts: TripFacts,
    prefs: CanonicalPreferences,
) {
    if execute(&manager, trip_id, run, &facts, &prefs)
        .await
        .is_err()
    {
        debug!(
            trip_id = %trip_id,
            run = run,
            "Run superseded, discarding remaining pipeline work"
        );
    }
}

async fn execute(
    manager: &GenerationManager,
    trip_id: Uuid,
    run: u64,
    facts: &TripFacts,
    prefs: &CanonicalPreferences,
) -> Result<(), Superseded> {
    let mut warnings = Vec::new();

    // Stage 1: preference application
    manager
        .begin_stage(trip_id, run, GenerationStage::ApplyingPreferences)
        .await?;
    let filters = SearchFilters::from_preferences(prefs);
    debug!(
        trip_id = %trip_id,
        run = run,
        cuisines = filters.cuisines.len(),
        interest_tags = filters.interest_tags.len(),
        "Preferences applied"
    );

    // Stages 2-4: per-category enrichment; each failure degrades locally
    let mut enriched = Vec::with_capacity(3);
    for (stage, category) in [
        (GenerationStage::DiningEnrichment, ItemCategory::Dining),
        (GenerationStage::AttractionEnrichment, ItemCategory::Attraction),
        (GenerationStage::EventEnrichment, ItemCategory::Event),
    ] {
        manager.begin_stage(trip_id, run, stage).await?;
        let result = manager
            .enrichment()
            .enrich(category, &facts.destination, &facts.date_range, prefs)
            .await;
        if let Some(warning) = result.warning {
            manager.add_warning(trip_id, run, warning.clone()).await?;
            warnings.push(warning);
        }
        enriched.push(result.items);
    }
    let events = enriched.pop().unwrap_or_default();
    let attractions = enriched.pop().unwrap_or_default();
    let dining = enriched.pop().unwrap_or_default();

    // Stage 5: weather lookup
    manager
        .begin_stage(trip_id, run, GenerationStage::WeatherLookup)
        .await?;
    let weather = manager
        .enrichment()
        .weather_for(&facts.destination, &facts.date_range)
        .await;
    if let Some(warning) = weather.warning {
        manager.add_warning(trip_id, run, warning.clone()).await?;
        warnings.push(warning);
    }

    // Stage 6: narrative content plus itinerary assembly. Content
    // generation is total (template fallback); assembly failing is fatal.
    manager
        .begin_stage(trip_id, run, GenerationStage::ItineraryAssembly)
        .await?;
    let (content, provider) = manager.providers().generate(facts, prefs).await;

    let guide = match assembler::assemble_guide(
        trip_id,
        facts,
        prefs,
        content,
        provider,
        dining,
        attractions,
        events,
        weather.days,
        warnings,
    ) {
        Ok(guide) => guide,
        Err(e) => {
            manager
                .fail(
                    trip_id,
                    run,
                    format!("Could not build an itinerary: {}", e),
                )
                .await?;
            return Ok(());
        }
    };

    // Stage 7: persist the artifact
    manager
        .begin_stage(trip_id, run, GenerationStage::Finalizing)
        .await?;
    match manager.guide_store().put(&guide).await {
        Ok(()) => manager.complete(trip_id, run, provider).await?,
        Err(e) => {
            tracing::error!(
                trip_id = %trip_id,
                run = run,
                error = %e,
                "Guide persistence failed"
            );
            manager
                .fail(
                    trip_id,
                    run,
                    "Could not save the generated guide".to_string(),
                )
                .await?;
        }
    }

    Ok(())
}
