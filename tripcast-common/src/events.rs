//! Event types for the Tripcast event system
//!
//! Provides shared event definitions and the EventBus used to fan guide
//! generation progress out to SSE subscribers.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Guide generation events
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
/// Every event is stamped with the trip id and the run identity of the
/// generation attempt that produced it, so subscribers can discard events
/// from superseded runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GuideEvent {
    /// A generation run was accepted and its pipeline task spawned
    GenerationStarted {
        trip_id: Uuid,
        /// Run identity counter for this trip
        run: u64,
        destination: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A pipeline stage boundary was crossed
    ///
    /// Percent is monotonically non-decreasing within a run.
    GenerationProgress {
        trip_id: Uuid,
        run: u64,
        /// Stage name (e.g. "dining_enrichment")
        stage: String,
        percent: u8,
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The guide was assembled and persisted
    GenerationCompleted {
        trip_id: Uuid,
        run: u64,
        /// Content provider that produced the narrative sections
        provider: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The run hit an unrecoverable stage failure
    GenerationFailed {
        trip_id: Uuid,
        run: u64,
        error: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl GuideEvent {
    /// Get event type as string for SSE event naming and filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            GuideEvent::GenerationStarted { .. } => "GenerationStarted",
            GuideEvent::GenerationProgress { .. } => "GenerationProgress",
            GuideEvent::GenerationCompleted { .. } => "GenerationCompleted",
            GuideEvent::GenerationFailed { .. } => "GenerationFailed",
        }
    }

    /// Trip id the event belongs to
    pub fn trip_id(&self) -> Uuid {
        match self {
            GuideEvent::GenerationStarted { trip_id, .. }
            | GuideEvent::GenerationProgress { trip_id, .. }
            | GuideEvent::GenerationCompleted { trip_id, .. }
            | GuideEvent::GenerationFailed { trip_id, .. } => *trip_id,
        }
    }

    /// True for events that end a run (stream terminators)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GuideEvent::GenerationCompleted { .. } | GuideEvent::GenerationFailed { .. }
        )
    }
}

/// Broadcast bus for guide events
///
/// Thin wrapper over `tokio::sync::broadcast`. Emission never blocks;
/// subscribers that fall behind lose the oldest buffered events, and
/// subscribers that disconnect simply drop their receiver without
/// affecting the sender or other subscribers.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<GuideEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<GuideEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// Progress updates are observable through the polling snapshot as well,
    /// so a missed broadcast is never a correctness problem.
    pub fn emit_lossy(&self, event: GuideEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
