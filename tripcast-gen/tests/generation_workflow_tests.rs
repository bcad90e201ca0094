//! Generation pipeline integration tests
//!
//! Exercises the job manager against in-memory collaborators: single-flight
//! starts, monotonic progress, degraded categories, superseded runs, and
//! cache behavior across consecutive runs.

mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use support::*;
use tokio::sync::Notify;
use tripcast_common::events::GuideEvent;
use tripcast_gen::enrichment::{EnrichError, PlaceSearch, SearchFilters};
use tripcast_gen::models::{EnrichedItem, GenerationState, ItemCategory};
use tripcast_gen::store::GuideStore;
use uuid::Uuid;

#[tokio::test]
async fn completed_run_produces_persisted_guide() {
    let harness = default_harness();
    let trip_id = Uuid::new_v4();

    let outcome = harness
        .manager
        .start(trip_id, paris_facts(), Default::default(), false)
        .await;
    assert!(outcome.accepted());

    let snapshot = wait_for_terminal(&harness.manager, trip_id).await;
    assert_eq!(snapshot.status, GenerationState::Completed);
    assert_eq!(snapshot.progress_percent, 100);
    assert_eq!(snapshot.provider.as_deref(), Some("template"));

    let guide = harness.guides.get(trip_id).await.unwrap().unwrap();
    assert_eq!(guide.trip_id, trip_id);
    assert_eq!(guide.days.len(), 4);
    assert!(!guide.dining.is_empty());
    assert!(!guide.attractions.is_empty());
    assert_eq!(guide.weather.len(), 4);
}

#[tokio::test]
async fn concurrent_starts_yield_one_run() {
    let harness = default_harness();
    let trip_id = Uuid::new_v4();
    let mut started_rx = harness.event_bus.subscribe();

    let facts = paris_facts();
    let (a, b, c, d, e) = tokio::join!(
        harness.manager.start(trip_id, facts.clone(), Default::default(), false),
        harness.manager.start(trip_id, facts.clone(), Default::default(), false),
        harness.manager.start(trip_id, facts.clone(), Default::default(), false),
        harness.manager.start(trip_id, facts.clone(), Default::default(), false),
        harness.manager.start(trip_id, facts.clone(), Default::default(), false),
    );

    let outcomes = [a, b, c, d, e];
    let accepted = outcomes.iter().filter(|o| o.accepted()).count();
    assert_eq!(accepted, 1, "exactly one start call wins");

    // Every caller observes the same underlying run
    let winning_run = outcomes
        .iter()
        .find(|o| o.accepted())
        .unwrap()
        .snapshot()
        .run;
    for outcome in &outcomes {
        assert_eq!(outcome.snapshot().run, winning_run);
    }

    wait_for_terminal(&harness.manager, trip_id).await;

    // Exactly one GenerationStarted event was broadcast
    let mut started_events = 0;
    while let Ok(event) = started_rx.try_recv() {
        if matches!(event, GuideEvent::GenerationStarted { .. }) {
            started_events += 1;
        }
    }
    assert_eq!(started_events, 1);
}

#[tokio::test]
async fn subscriber_observes_monotonic_progress_ending_at_100() {
    let harness = default_harness();
    let trip_id = Uuid::new_v4();
    let mut rx = harness.event_bus.subscribe();

    harness
        .manager
        .start(trip_id, paris_facts(), Default::default(), false)
        .await;
    wait_for_terminal(&harness.manager, trip_id).await;

    let mut percents = Vec::new();
    let mut saw_completed = false;
    while let Ok(event) = rx.try_recv() {
        match event {
            GuideEvent::GenerationProgress { percent, .. } => percents.push(percent),
            GuideEvent::GenerationCompleted { .. } => saw_completed = true,
            _ => {}
        }
    }

    assert!(saw_completed);
    assert!(!percents.is_empty());
    assert!(percents.windows(2).all(|w| w[0] <= w[1]));

    let snapshot = harness.manager.status(trip_id).await.unwrap();
    assert_eq!(snapshot.progress_percent, 100);
}

#[tokio::test]
async fn failed_attraction_provider_degrades_without_failing_the_run() {
    let mut places = StaticPlaces::paris();
    places.fail_attractions = true;
    let harness = harness_with(
        Arc::new(places),
        Arc::new(StaticEvents::paris()),
        Arc::new(StaticWeather),
        Vec::new(),
    );
    let trip_id = Uuid::new_v4();

    harness
        .manager
        .start(trip_id, paris_facts(), Default::default(), false)
        .await;
    let snapshot = wait_for_terminal(&harness.manager, trip_id).await;

    assert_eq!(snapshot.status, GenerationState::Completed);
    assert!(snapshot
        .warnings
        .iter()
        .any(|w| w.contains("attraction")));

    let guide = harness.guides.get(trip_id).await.unwrap().unwrap();
    assert!(guide.attractions.is_empty());
    assert!(!guide.dining.is_empty());
    assert!(!guide.events.is_empty());
}

#[tokio::test]
async fn second_run_within_ttl_reuses_cached_enrichment() {
    let places = StaticPlaces::paris();
    let calls = places.calls.clone();
    let harness = harness_with(
        Arc::new(places),
        Arc::new(StaticEvents::paris()),
        Arc::new(StaticWeather),
        Vec::new(),
    );
    let trip_id = Uuid::new_v4();

    harness
        .manager
        .start(trip_id, paris_facts(), Default::default(), false)
        .await;
    wait_for_terminal(&harness.manager, trip_id).await;
    let first_run_calls = calls.load(Ordering::SeqCst);
    assert_eq!(first_run_calls, 2, "dining + attraction queries");

    // Terminal job accepts a fresh start; same preferences hit the cache
    harness
        .manager
        .start(trip_id, paris_facts(), Default::default(), false)
        .await;
    wait_for_terminal(&harness.manager, trip_id).await;

    assert_eq!(calls.load(Ordering::SeqCst), first_run_calls);
}

/// Blocks dining searches until released; later categories pass through
struct GatedPlaces {
    gate: Arc<Notify>,
    calls: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl PlaceSearch for GatedPlaces {
    async fn search(
        &self,
        category: ItemCategory,
        _destination: &str,
        _filters: &SearchFilters,
    ) -> Result<Vec<EnrichedItem>, EnrichError> {
        if category == ItemCategory::Dining {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
        }
        Ok(vec![enriched_item(
            "Placeholder",
            category,
            &[],
        )])
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn forced_restart_supersedes_the_active_run() {
    let gate = Arc::new(Notify::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let harness = harness_with(
        Arc::new(GatedPlaces {
            gate: gate.clone(),
            calls: calls.clone(),
        }),
        Arc::new(StaticEvents::paris()),
        Arc::new(StaticWeather),
        Vec::new(),
    );
    let trip_id = Uuid::new_v4();

    // Run 1 parks inside the dining query
    let first = harness
        .manager
        .start(trip_id, paris_facts(), Default::default(), false)
        .await;
    assert!(first.accepted());
    assert_eq!(first.snapshot().run, 1);

    // Wait until run 1 is actually inside the provider call
    for _ in 0..100 {
        if calls.load(Ordering::SeqCst) >= 1 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // A duplicate start joins the running job...
    let duplicate = harness
        .manager
        .start(trip_id, paris_facts(), Default::default(), false)
        .await;
    assert!(!duplicate.accepted());

    // ...but a forced start supersedes it
    let second = harness
        .manager
        .start(trip_id, paris_facts(), Default::default(), true)
        .await;
    assert!(second.accepted());
    assert_eq!(second.snapshot().run, 2);

    // Run 2 also parks in the dining query; release both
    for _ in 0..100 {
        if calls.load(Ordering::SeqCst) >= 2 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    gate.notify_waiters();

    let snapshot = wait_for_terminal(&harness.manager, trip_id).await;
    assert_eq!(snapshot.run, 2, "terminal state belongs to the superseding run");
    assert_eq!(snapshot.status, GenerationState::Completed);

    // The stale run's late results never regress the record
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let after = harness.manager.status(trip_id).await.unwrap();
    assert_eq!(after.run, 2);
    assert_eq!(after.status, GenerationState::Completed);
}

#[tokio::test]
async fn retention_sweep_prunes_terminal_jobs() {
    let harness = default_harness();
    let trip_id = Uuid::new_v4();

    harness
        .manager
        .start(trip_id, paris_facts(), Default::default(), false)
        .await;
    wait_for_terminal(&harness.manager, trip_id).await;

    // Generous window keeps the record
    harness
        .manager
        .prune_finished(std::time::Duration::from_secs(3600))
        .await;
    assert!(harness.manager.status(trip_id).await.is_some());

    // Zero window drops it; status falls back to idle semantics
    harness
        .manager
        .prune_finished(std::time::Duration::from_secs(0))
        .await;
    assert!(harness.manager.status(trip_id).await.is_none());
}
