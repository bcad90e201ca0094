//! Guide artifact persistence
//!
//! One guide per trip id; a newer successful run replaces the stored guide
//! wholesale.

use crate::models::Guide;
use sqlx::{Row, SqlitePool};
use tripcast_common::Result;
use uuid::Uuid;

/// Upsert the guide for a trip
pub async fn save_guide(pool: &SqlitePool, guide: &Guide) -> Result<()> {
    let guide_json = serde_json::to_string(guide)
        .map_err(|e| tripcast_common::Error::Internal(format!("Failed to serialize guide: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO guides (trip_id, guide, generated_at)
        VALUES (?, ?, ?)
        ON CONFLICT(trip_id) DO UPDATE SET
            guide = excluded.guide,
            generated_at = excluded.generated_at
        "#,
    )
    .bind(guide.trip_id.to_string())
    .bind(&guide_json)
    .bind(guide.generated_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load the guide for a trip
pub async fn load_guide(pool: &SqlitePool, trip_id: Uuid) -> Result<Option<Guide>> {
    let row = sqlx::query("SELECT guide FROM guides WHERE trip_id = ?")
        .bind(trip_id.to_string())
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => {
            let guide_json: String = row.get("guide");
            let guide = serde_json::from_str(&guide_json).map_err(|e| {
                tripcast_common::Error::Internal(format!("Failed to deserialize guide: {}", e))
            })?;
            Ok(Some(guide))
        }
        None => Ok(None),
    }
}

/// Delete the guide for a trip
pub async fn delete_guide(pool: &SqlitePool, trip_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM guides WHERE trip_id = ?")
        .bind(trip_id.to_string())
        .execute(pool)
        .await?;
    Ok(())
}
