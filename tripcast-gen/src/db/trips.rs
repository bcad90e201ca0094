//! Trip facts persistence

use crate::models::TripFacts;
use sqlx::{Row, SqlitePool};
use tripcast_common::Result;
use uuid::Uuid;

/// Upsert trip facts
pub async fn save_trip(pool: &SqlitePool, trip_id: Uuid, facts: &TripFacts) -> Result<()> {
    let facts_json = serde_json::to_string(facts)
        .map_err(|e| tripcast_common::Error::Internal(format!("Failed to serialize facts: {}", e)))?;
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO trips (trip_id, facts, created_at, updated_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(trip_id) DO UPDATE SET
            facts = excluded.facts,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(trip_id.to_string())
    .bind(&facts_json)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load trip facts
pub async fn load_trip(pool: &SqlitePool, trip_id: Uuid) -> Result<Option<TripFacts>> {
    let row = sqlx::query("SELECT facts FROM trips WHERE trip_id = ?")
        .bind(trip_id.to_string())
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => {
            let facts_json: String = row.get("facts");
            let facts = serde_json::from_str(&facts_json).map_err(|e| {
                tripcast_common::Error::Internal(format!("Failed to deserialize facts: {}", e))
            })?;
            Ok(Some(facts))
        }
        None => Ok(None),
    }
}

/// Delete trip facts
pub async fn delete_trip(pool: &SqlitePool, trip_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM trips WHERE trip_id = ?")
        .bind(trip_id.to_string())
        .execute(pool)
        .await?;
    Ok(())
}
