//! Guide generation API handlers
//!
//! POST /trips/{id}/generate, GET /trips/{id}/generation/status,
//! GET /trips/{id}/guide

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{GenerationState, Guide, JobSnapshot},
    normalize,
    AppState,
};

/// POST /trips/{trip_id}/generate request
#[derive(Debug, Default, Deserialize)]
pub struct StartGenerationRequest {
    /// Raw preference payload in any supported client shape
    #[serde(default)]
    pub preferences: Option<serde_json::Value>,
    /// Supersede an active run instead of returning its snapshot
    #[serde(default)]
    pub force: bool,
}

/// POST /trips/{trip_id}/generate response
#[derive(Debug, Serialize)]
pub struct StartGenerationResponse {
    /// False when an active run was returned instead of a new one
    pub accepted: bool,
    pub status: GenerationStatusResponse,
}

/// Client-facing generation status
///
/// `idle` means the trip exists but no generation has run (or the record
/// aged out of retention).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Idle,
    Running,
    Completed,
    Error,
}

impl From<GenerationState> for StatusKind {
    fn from(state: GenerationState) -> Self {
        match state {
            GenerationState::Running => StatusKind::Running,
            GenerationState::Completed => StatusKind::Completed,
            GenerationState::Failed => StatusKind::Error,
        }
    }
}

/// GET /trips/{trip_id}/generation/status response
#[derive(Debug, Serialize)]
pub struct GenerationStatusResponse {
    pub trip_id: Uuid,
    pub status: StatusKind,
    pub progress_percent: u8,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl GenerationStatusResponse {
    pub fn from_snapshot(snapshot: &JobSnapshot) -> Self {
        Self {
            trip_id: snapshot.trip_id,
            status: snapshot.status.into(),
            progress_percent: snapshot.progress_percent,
            message: snapshot.message.clone(),
            stage: Some(snapshot.stage.clone()),
            warnings: snapshot.warnings.clone(),
            started_at: Some(snapshot.started_at),
            finished_at: snapshot.finished_at,
            last_error: snapshot.last_error.clone(),
        }
    }

    pub fn idle(trip_id: Uuid) -> Self {
        Self {
            trip_id,
            status: StatusKind::Idle,
            progress_percent: 0,
            message: "No generation has run for this trip".to_string(),
            stage: None,
            warnings: Vec::new(),
            started_at: None,
            finished_at: None,
            last_error: None,
        }
    }
}

/// POST /trips/{trip_id}/generate
///
/// Normalizes the preference payload, validates the trip, and starts (or
/// joins) the generation run. Returns 202 Accepted immediately; the
/// pipeline runs in the background.
pub async fn start_generation(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
    Json(request): Json<StartGenerationRequest>,
) -> ApiResult<(StatusCode, Json<StartGenerationResponse>)> {
    // Input errors are rejected synchronously and never create a job
    let payload = request.preferences.unwrap_or(serde_json::Value::Null);
    if !payload.is_object() && !payload.is_null() {
        return Err(ApiError::BadRequest(
            "preferences must be a JSON object".to_string(),
        ));
    }

    let facts = state
        .trips
        .get(trip_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Trip not found: {}", trip_id)))?;

    let prefs = normalize::normalize(&payload);

    let outcome = state
        .manager
        .start(trip_id, facts, prefs, request.force)
        .await;

    let response = StartGenerationResponse {
        accepted: outcome.accepted(),
        status: GenerationStatusResponse::from_snapshot(outcome.snapshot()),
    };

    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// GET /trips/{trip_id}/generation/status
///
/// Poll generation progress. Never blocks on the pipeline.
pub async fn get_generation_status(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
) -> ApiResult<Json<GenerationStatusResponse>> {
    if let Some(snapshot) = state.manager.status(trip_id).await {
        return Ok(Json(GenerationStatusResponse::from_snapshot(&snapshot)));
    }

    // Distinguish "known trip, nothing run yet" from "unknown trip"
    if state.trips.get(trip_id).await?.is_some() {
        return Ok(Json(GenerationStatusResponse::idle(trip_id)));
    }

    Err(ApiError::NotFound(format!("Trip not found: {}", trip_id)))
}

/// GET /trips/{trip_id}/guide
///
/// Fetch the persisted guide. 409 while a run is still in flight, 404 when
/// the trip is unknown or no guide has been generated.
pub async fn get_guide(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
) -> ApiResult<Json<Guide>> {
    if state.manager.is_running(trip_id).await {
        return Err(ApiError::Conflict(
            "Guide generation is still running".to_string(),
        ));
    }

    let guide = state
        .guides
        .get(trip_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No guide for trip: {}", trip_id)))?;

    Ok(Json(guide))
}

/// Build generation routes
pub fn generation_routes() -> Router<AppState> {
    Router::new()
        .route("/trips/:trip_id/generate", post(start_generation))
        .route(
            "/trips/:trip_id/generation/status",
            get(get_generation_status),
        )
        .route("/trips/:trip_id/guide", get(get_guide))
}
