//! Generation job management
//!
//! The GenerationManager guarantees at most one active generation per trip
//! id, drives the staged pipeline, and is the single source of truth for
//! progress. Job records live in an arena keyed by trip id; each record
//! carries a run-identity counter, and every mutation from a pipeline task
//! is guarded by comparing that counter, so a superseded run's late results
//! are detected and discarded at the next stage boundary instead of being
//! force-cancelled mid-call.

pub mod assembler;
pub mod pipeline;

use crate::enrichment::EnrichmentService;
use crate::models::{CanonicalPreferences, GenerationJob, GenerationStage, JobSnapshot, TripFacts};
use crate::providers::ProviderChain;
use crate::store::GuideStore;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};
use tripcast_common::{EventBus, GuideEvent};
use uuid::Uuid;

/// Returned by guarded mutators when the caller's run identity no longer
/// matches the job record (a newer run has replaced it)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Superseded;

/// Outcome of a start request
#[derive(Debug, Clone)]
pub enum StartOutcome {
    /// A fresh run was accepted and its pipeline task spawned
    Started(JobSnapshot),
    /// A run is already active; its snapshot is returned and no new run
    /// begins (single-flight)
    AlreadyRunning(JobSnapshot),
}

impl StartOutcome {
    pub fn accepted(&self) -> bool {
        matches!(self, StartOutcome::Started(_))
    }

    pub fn snapshot(&self) -> &JobSnapshot {
        match self {
            StartOutcome::Started(snapshot) | StartOutcome::AlreadyRunning(snapshot) => snapshot,
        }
    }
}

/// Owns one job record per trip id and runs the generation pipeline
pub struct GenerationManager {
    jobs: RwLock<HashMap<Uuid, GenerationJob>>,
    enrichment: Arc<EnrichmentService>,
    providers: Arc<ProviderChain>,
    guide_store: Arc<dyn GuideStore>,
    event_bus: EventBus,
}

impl GenerationManager {
    pub fn new(
        enrichment: Arc<EnrichmentService>,
        providers: Arc<ProviderChain>,
        guide_store: Arc<dyn GuideStore>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            enrichment,
            providers,
            guide_store,
            event_bus,
        }
    }

    /// Start generation for a trip
    ///
    /// If a run is already active and `force` is false, returns the active
    /// run's snapshot without starting a second one. Otherwise installs a
    /// fresh job record (bumping the run identity, which supersedes any
    /// active run) and spawns the pipeline task. Returns immediately in
    /// both cases.
    pub async fn start(
        self: &Arc<Self>,
        trip_id: Uuid,
        facts: TripFacts,
        prefs: CanonicalPreferences,
        force: bool,
    ) -> StartOutcome {
        let mut jobs = self.jobs.write().await;

        if let Some(existing) = jobs.get(&trip_id) {
            if !existing.is_terminal() && !force {
                debug!(
                    trip_id = %trip_id,
                    run = existing.run,
                    "Generation already running, returning existing snapshot"
                );
                return StartOutcome::AlreadyRunning(existing.snapshot());
            }
        }

        let run = jobs.get(&trip_id).map(|job| job.run + 1).unwrap_or(1);
        let job = GenerationJob::new(trip_id, run);
        let snapshot = job.snapshot();
        jobs.insert(trip_id, job);
        drop(jobs);

        info!(
            trip_id = %trip_id,
            run = run,
            destination = %facts.destination,
            "Generation run accepted"
        );

        self.event_bus.emit_lossy(GuideEvent::GenerationStarted {
            trip_id,
            run,
            destination: facts.destination.clone(),
            timestamp: chrono::Utc::now(),
        });

        let manager = Arc::clone(self);
        tokio::spawn(async move {
            pipeline::run_pipeline(manager, trip_id, run, facts, prefs).await;
        });

        StartOutcome::Started(snapshot)
    }

    /// Point-in-time job snapshot; None when no job has ever run
    ///
    /// Never blocks on the pipeline and never mutates state.
    pub async fn status(&self, trip_id: Uuid) -> Option<JobSnapshot> {
        self.jobs.read().await.get(&trip_id).map(|job| job.snapshot())
    }

    /// True while a run is active for the trip
    pub async fn is_running(&self, trip_id: Uuid) -> bool {
        self.jobs
            .read()
            .await
            .get(&trip_id)
            .map(|job| !job.is_terminal())
            .unwrap_or(false)
    }

    /// Drop terminal job records older than the retention window
    pub async fn prune_finished(&self, retention: Duration) {
        let cutoff = chrono::Utc::now()
            - chrono::Duration::from_std(retention).unwrap_or(chrono::Duration::hours(1));
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, job| match (job.is_terminal(), job.finished_at) {
            (true, Some(finished_at)) => finished_at > cutoff,
            _ => true,
        });
        let pruned = before - jobs.len();
        if pruned > 0 {
            debug!(pruned = pruned, "Pruned finished generation jobs");
        }
    }

    /// Enter a stage on behalf of run `run`
    ///
    /// Fails with Superseded when the record now belongs to a newer run (or
    /// was pruned); the caller must stop advancing.
    pub(crate) async fn begin_stage(
        &self,
        trip_id: Uuid,
        run: u64,
        stage: GenerationStage,
    ) -> Result<(), Superseded> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&trip_id)
            .filter(|job| job.run == run && !job.is_terminal())
            .ok_or(Superseded)?;

        job.enter_stage(stage);
        let snapshot = job.snapshot();
        drop(jobs);

        debug!(
            trip_id = %trip_id,
            run = run,
            stage = stage.name(),
            percent = snapshot.progress_percent,
            "Stage started"
        );

        self.event_bus.emit_lossy(GuideEvent::GenerationProgress {
            trip_id,
            run,
            stage: snapshot.stage,
            percent: snapshot.progress_percent,
            message: snapshot.message,
            timestamp: chrono::Utc::now(),
        });

        Ok(())
    }

    /// Record a degraded-category warning on the job
    pub(crate) async fn add_warning(
        &self,
        trip_id: Uuid,
        run: u64,
        warning: String,
    ) -> Result<(), Superseded> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&trip_id)
            .filter(|job| job.run == run && !job.is_terminal())
            .ok_or(Superseded)?;
        job.add_warning(warning);
        Ok(())
    }

    /// Terminal success for run `run`
    pub(crate) async fn complete(
        &self,
        trip_id: Uuid,
        run: u64,
        provider: &str,
    ) -> Result<(), Superseded> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&trip_id)
            .filter(|job| job.run == run && !job.is_terminal())
            .ok_or(Superseded)?;
        job.complete(provider.to_string());
        drop(jobs);

        info!(trip_id = %trip_id, run = run, provider = provider, "Generation completed");

        self.event_bus.emit_lossy(GuideEvent::GenerationCompleted {
            trip_id,
            run,
            provider: provider.to_string(),
            timestamp: chrono::Utc::now(),
        });

        Ok(())
    }

    /// Terminal failure for run `run` with a human-readable reason
    pub(crate) async fn fail(
        &self,
        trip_id: Uuid,
        run: u64,
        reason: String,
    ) -> Result<(), Superseded> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&trip_id)
            .filter(|job| job.run == run && !job.is_terminal())
            .ok_or(Superseded)?;
        job.fail(reason.clone());
        drop(jobs);

        tracing::error!(trip_id = %trip_id, run = run, reason = %reason, "Generation failed");

        self.event_bus.emit_lossy(GuideEvent::GenerationFailed {
            trip_id,
            run,
            error: reason,
            timestamp: chrono::Utc::now(),
        });

        Ok(())
    }

    pub(crate) fn enrichment(&self) -> &EnrichmentService {
        &self.enrichment
    }

    pub(crate) fn providers(&self) -> &ProviderChain {
        &self.providers
    }

    pub(crate) fn guide_store(&self) -> &dyn GuideStore {
        self.guide_store.as_ref()
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
