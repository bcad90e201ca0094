//! Server-Sent Events (SSE) for generation progress streaming
//!
//! One logical subscription per trip id: the stream opens with a snapshot
//! of the current job (so late subscribers and reconnecting clients
//! re-sync), forwards every status transition for that trip in order, and
//! terminates once a terminal event has been delivered. Progress values
//! come from the same job record the polling endpoint reads, so both paths
//! always agree.

use crate::api::generation::GenerationStatusResponse;
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tripcast_common::sse::HEARTBEAT_INTERVAL;
use uuid::Uuid;

/// GET /events - heartbeat-only SSE stream for connection status monitoring
pub async fn event_stream(
    State(_state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tripcast_common::sse::create_heartbeat_sse_stream("tripcast-gen")
}

/// GET /trips/{trip_id}/generation/events - SSE stream of generation progress
pub async fn generation_event_stream(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!(trip_id = %trip_id, "New SSE client connected to generation events");

    // Subscribe before snapshotting so no transition falls in the gap
    let mut rx = state.event_bus.subscribe();
    let snapshot = state.manager.status(trip_id).await;

    let stream = async_stream::stream! {
        let mut terminal_seen = false;

        if let Some(snapshot) = snapshot {
            let status = GenerationStatusResponse::from_snapshot(&snapshot);
            terminal_seen = !matches!(
                status.status,
                crate::api::generation::StatusKind::Running
            );
            match serde_json::to_string(&status) {
                Ok(json) => {
                    yield Ok(Event::default().event("GenerationSnapshot").data(json));
                }
                Err(e) => {
                    warn!(trip_id = %trip_id, error = %e, "SSE: Failed to serialize snapshot");
                }
            }
        }

        while !terminal_seen {
            tokio::select! {
                // Heartbeat keeps proxies from reaping quiet connections
                _ = tokio::time::sleep(HEARTBEAT_INTERVAL) => {
                    debug!("SSE: Sending heartbeat");
                    yield Ok(Event::default().comment("heartbeat"));
                }

                result = rx.recv() => {
                    match result {
                        Ok(event) if event.trip_id() == trip_id => {
                            let event_type = event.event_type();
                            terminal_seen = event.is_terminal();

                            match serde_json::to_string(&event) {
                                Ok(json) => {
                                    debug!(
                                        trip_id = %trip_id,
                                        event_type = event_type,
                                        "SSE: Forwarding generation event"
                                    );
                                    yield Ok(Event::default().event(event_type).data(json));
                                }
                                Err(e) => {
                                    warn!(
                                        trip_id = %trip_id,
                                        error = %e,
                                        "SSE: Failed to serialize event {}", event_type
                                    );
                                }
                            }
                        }
                        // Events for other trips are not this subscriber's
                        Ok(_) => {}
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(
                                trip_id = %trip_id,
                                skipped = skipped,
                                "SSE: Subscriber lagged, some events dropped"
                            );
                        }
                        Err(RecvError::Closed) => {
                            debug!(trip_id = %trip_id, "SSE: Event bus closed, ending stream");
                            break;
                        }
                    }
                }
            }
        }

        info!(trip_id = %trip_id, "SSE: Generation event stream ended");
    };

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(HEARTBEAT_INTERVAL)
            .text("heartbeat"),
    )
}
