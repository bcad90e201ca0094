//! Generation job state machine
//!
//! One job record per trip id while generation is in flight or has most
//! recently run. The record is owned by the GenerationManager and mutated
//! only under its lock; everything else reads snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ordered pipeline stages
///
/// Each stage completion advances progress by an equal share of 100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStage {
    ApplyingPreferences,
    DiningEnrichment,
    AttractionEnrichment,
    EventEnrichment,
    WeatherLookup,
    ItineraryAssembly,
    Finalizing,
}

impl GenerationStage {
    pub const ALL: [GenerationStage; 7] = [
        GenerationStage::ApplyingPreferences,
        GenerationStage::DiningEnrichment,
        GenerationStage::AttractionEnrichment,
        GenerationStage::EventEnrichment,
        GenerationStage::WeatherLookup,
        GenerationStage::ItineraryAssembly,
        GenerationStage::Finalizing,
    ];

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    pub fn name(&self) -> &'static str {
        match self {
            GenerationStage::ApplyingPreferences => "applying_preferences",
            GenerationStage::DiningEnrichment => "dining_enrichment",
            GenerationStage::AttractionEnrichment => "attraction_enrichment",
            GenerationStage::EventEnrichment => "event_enrichment",
            GenerationStage::WeatherLookup => "weather_lookup",
            GenerationStage::ItineraryAssembly => "itinerary_assembly",
            GenerationStage::Finalizing => "finalizing",
        }
    }

    /// Human-readable stage description shown to clients
    pub fn description(&self) -> &'static str {
        match self {
            GenerationStage::ApplyingPreferences => "Applying your preferences...",
            GenerationStage::DiningEnrichment => "Finding restaurants...",
            GenerationStage::AttractionEnrichment => "Finding attractions...",
            GenerationStage::EventEnrichment => "Finding local events...",
            GenerationStage::WeatherLookup => "Checking the forecast...",
            GenerationStage::ItineraryAssembly => "Building your itinerary...",
            GenerationStage::Finalizing => "Saving your guide...",
        }
    }

    /// Progress percent when this stage begins
    pub fn percent_on_entry(&self) -> u8 {
        ((self.index() * 100) / Self::ALL.len()) as u8
    }

    /// Progress percent once this stage has completed
    pub fn percent_on_completion(&self) -> u8 {
        (((self.index() + 1) * 100) / Self::ALL.len()) as u8
    }
}

/// Job run state
///
/// `Failed` serializes as "error", matching the status strings clients see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationState {
    Running,
    Completed,
    #[serde(rename = "error")]
    Failed,
}

/// Progress tracking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationProgress {
    /// Percentage complete (0-100), monotonically non-decreasing within a run
    pub percent: u8,
    /// Current operation description
    pub message: String,
}

/// One generation attempt for a trip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationJob {
    pub trip_id: Uuid,
    /// Run identity; bumped on every fresh start for the same trip
    pub run: u64,
    pub state: GenerationState,
    pub stage: GenerationStage,
    pub progress: GenerationProgress,
    /// Warnings from degraded enrichment categories
    pub warnings: Vec<String>,
    /// Content provider that served this run (set on completion)
    pub provider: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl GenerationJob {
    pub fn new(trip_id: Uuid, run: u64) -> Self {
        let stage = GenerationStage::ApplyingPreferences;
        Self {
            trip_id,
            run,
            state: GenerationState::Running,
            stage,
            progress: GenerationProgress {
                percent: 0,
                message: stage.description().to_string(),
            },
            warnings: Vec::new(),
            provider: None,
            started_at: Utc::now(),
            finished_at: None,
            last_error: None,
        }
    }

    /// Enter a stage: update stage, message, and percent (never backwards)
    pub fn enter_stage(&mut self, stage: GenerationStage) {
        self.stage = stage;
        self.progress.message = stage.description().to_string();
        self.progress.percent = self.progress.percent.max(stage.percent_on_entry());
    }

    /// Record a stage as completed, advancing percent by its share
    pub fn complete_stage(&mut self, stage: GenerationStage) {
        self.progress.percent = self.progress.percent.max(stage.percent_on_completion());
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Terminal success: guide persisted
    pub fn complete(&mut self, provider: String) {
        self.state = GenerationState::Completed;
        self.provider = Some(provider);
        self.progress.percent = 100;
        self.progress.message = "Guide ready".to_string();
        self.finished_at = Some(Utc::now());
    }

    /// Terminal failure with a human-readable reason
    pub fn fail(&mut self, reason: String) {
        self.state = GenerationState::Failed;
        self.progress.message = reason.clone();
        self.last_error = Some(reason);
        self.finished_at = Some(Utc::now());
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            GenerationState::Completed | GenerationState::Failed
        )
    }

    /// Point-in-time view handed to status queries and SSE snapshots
    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            trip_id: self.trip_id,
            run: self.run,
            status: self.state,
            stage: self.stage.name().to_string(),
            progress_percent: self.progress.percent,
            message: self.progress.message.clone(),
            warnings: self.warnings.clone(),
            provider: self.provider.clone(),
            started_at: self.started_at,
            finished_at: self.finished_at,
            last_error: self.last_error.clone(),
        }
    }
}

/// Serializable job view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub trip_id: Uuid,
    pub run: u64,
    pub status: GenerationState,
    pub stage: String,
    pub progress_percent: u8,
    pub message: String,
    pub warnings: Vec<String>,
    pub provider: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_percents_are_monotonic_and_end_at_100() {
        let mut previous = 0u8;
        for stage in GenerationStage::ALL {
            assert!(stage.percent_on_entry() >= previous);
            assert!(stage.percent_on_completion() > stage.percent_on_entry());
            previous = stage.percent_on_completion();
        }
        assert_eq!(GenerationStage::Finalizing.percent_on_completion(), 100);
    }

    #[test]
    fn progress_never_decreases_across_stages() {
        let mut job = GenerationJob::new(Uuid::new_v4(), 1);
        let mut observed = vec![job.progress.percent];

        for stage in GenerationStage::ALL {
            job.enter_stage(stage);
            observed.push(job.progress.percent);
            job.complete_stage(stage);
            observed.push(job.progress.percent);
        }
        job.complete("template".to_string());
        observed.push(job.progress.percent);

        assert!(observed.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*observed.last().unwrap(), 100);
    }

    #[test]
    fn completion_is_terminal() {
        let mut job = GenerationJob::new(Uuid::new_v4(), 1);
        assert!(!job.is_terminal());
        job.complete("primary-llm".to_string());
        assert!(job.is_terminal());
        assert_eq!(job.state, GenerationState::Completed);
        assert!(job.finished_at.is_some());
        assert_eq!(job.provider.as_deref(), Some("primary-llm"));
    }

    #[test]
    fn failure_records_reason() {
        let mut job = GenerationJob::new(Uuid::new_v4(), 2);
        job.fail("Itinerary assembly produced no days".to_string());
        assert!(job.is_terminal());
        assert_eq!(job.state, GenerationState::Failed);
        assert_eq!(
            job.last_error.as_deref(),
            Some("Itinerary assembly produced no days")
        );
    }

    #[test]
    fn failed_state_serializes_as_error() {
        let json = serde_json::to_string(&GenerationState::Failed).unwrap();
        assert_eq!(json, "\"error\"");
    }
}
