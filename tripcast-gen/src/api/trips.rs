//! Trip provisioning API handlers
//!
//! Upserts and reads the trip facts that the generation pipeline consumes.

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::TripFacts,
    AppState,
};

/// PUT /trips/{trip_id} response
#[derive(Debug, Serialize)]
pub struct PutTripResponse {
    pub trip_id: Uuid,
    pub destination: String,
}

/// PUT /trips/{trip_id}
///
/// Upsert trip facts. Destination and a usable date range are required.
pub async fn put_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
    Json(facts): Json<TripFacts>,
) -> ApiResult<Json<PutTripResponse>> {
    if facts.destination.trim().is_empty() {
        return Err(ApiError::BadRequest("destination must not be empty".to_string()));
    }

    state.trips.put(trip_id, &facts).await?;

    tracing::info!(
        trip_id = %trip_id,
        destination = %facts.destination,
        "Trip facts saved"
    );

    Ok(Json(PutTripResponse {
        trip_id,
        destination: facts.destination,
    }))
}

/// GET /trips/{trip_id}
pub async fn get_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
) -> ApiResult<Json<TripFacts>> {
    let facts = state
        .trips
        .get(trip_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Trip not found: {}", trip_id)))?;

    Ok(Json(facts))
}

/// Build trip provisioning routes
pub fn trip_routes() -> Router<AppState> {
    Router::new().route("/trips/:trip_id", put(put_trip).get(get_trip))
}
