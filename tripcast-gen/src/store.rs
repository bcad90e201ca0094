//! Storage seams for trips and guides
//!
//! Persistent storage is a collaborator behind narrow get/put/delete
//! interfaces keyed by trip id. Production uses SQLite; tests use the
//! in-memory implementations.

use crate::models::{Guide, TripFacts};
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tripcast_common::Result;
use uuid::Uuid;

/// Trip facts provider/store
#[async_trait]
pub trait TripStore: Send + Sync {
    async fn get(&self, trip_id: Uuid) -> Result<Option<TripFacts>>;
    async fn put(&self, trip_id: Uuid, facts: &TripFacts) -> Result<()>;
    async fn delete(&self, trip_id: Uuid) -> Result<()>;
}

/// Guide artifact store
#[async_trait]
pub trait GuideStore: Send + Sync {
    async fn put(&self, guide: &Guide) -> Result<()>;
    async fn get(&self, trip_id: Uuid) -> Result<Option<Guide>>;
    async fn delete(&self, trip_id: Uuid) -> Result<()>;
}

/// SQLite-backed trip store
pub struct SqliteTripStore {
    pool: SqlitePool,
}

impl SqliteTripStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TripStore for SqliteTripStore {
    async fn get(&self, trip_id: Uuid) -> Result<Option<TripFacts>> {
        crate::db::trips::load_trip(&self.pool, trip_id).await
    }

    async fn put(&self, trip_id: Uuid, facts: &TripFacts) -> Result<()> {
        crate::db::trips::save_trip(&self.pool, trip_id, facts).await
    }

    async fn delete(&self, trip_id: Uuid) -> Result<()> {
        crate::db::trips::delete_trip(&self.pool, trip_id).await
    }
}

/// SQLite-backed guide store
pub struct SqliteGuideStore {
    pool: SqlitePool,
}

impl SqliteGuideStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GuideStore for SqliteGuideStore {
    async fn put(&self, guide: &Guide) -> Result<()> {
        crate::db::guides::save_guide(&self.pool, guide).await
    }

    async fn get(&self, trip_id: Uuid) -> Result<Option<Guide>> {
        crate::db::guides::load_guide(&self.pool, trip_id).await
    }

    async fn delete(&self, trip_id: Uuid) -> Result<()> {
        crate::db::guides::delete_guide(&self.pool, trip_id).await
    }
}

/// In-memory trip store
#[derive(Default)]
pub struct MemoryTripStore {
    trips: RwLock<HashMap<Uuid, TripFacts>>,
}

impl MemoryTripStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TripStore for MemoryTripStore {
    async fn get(&self, trip_id: Uuid) -> Result<Option<TripFacts>> {
        Ok(self.trips.read().await.get(&trip_id).cloned())
    }

    async fn put(&self, trip_id: Uuid, facts: &TripFacts) -> Result<()> {
        self.trips.write().await.insert(trip_id, facts.clone());
        Ok(())
    }

    async fn delete(&self, trip_id: Uuid) -> Result<()> {
        self.trips.write().await.remove(&trip_id);
        Ok(())
    }
}

/// In-memory guide store
#[derive(Default)]
pub struct MemoryGuideStore {
    guides: RwLock<HashMap<Uuid, Guide>>,
}

impl MemoryGuideStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GuideStore for MemoryGuideStore {
    async fn put(&self, guide: &Guide) -> Result<()> {
        self.guides.write().await.insert(guide.trip_id, guide.clone());
        Ok(())
    }

    async fn get(&self, trip_id: Uuid) -> Result<Option<Guide>> {
        Ok(self.guides.read().await.get(&trip_id).cloned())
    }

    async fn delete(&self, trip_id: Uuid) -> Result<()> {
        self.guides.write().await.remove(&trip_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DateRange;
    use chrono::NaiveDate;

    fn facts() -> TripFacts {
        TripFacts {
            destination: "Porto, Portugal".to_string(),
            date_range: DateRange {
                start: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
            },
            traveler_count: 2,
            flights: vec![],
            hotels: vec![],
        }
    }

    #[tokio::test]
    async fn memory_trip_store_round_trip() {
        let store = MemoryTripStore::new();
        let trip_id = Uuid::new_v4();

        assert!(store.get(trip_id).await.unwrap().is_none());
        store.put(trip_id, &facts()).await.unwrap();
        let loaded = store.get(trip_id).await.unwrap().unwrap();
        assert_eq!(loaded.destination, "Porto, Portugal");

        store.delete(trip_id).await.unwrap();
        assert!(store.get(trip_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn memory_guide_store_overwrites_wholesale() {
        let store = MemoryGuideStore::new();
        let trip_id = Uuid::new_v4();

        let mut guide = Guide {
            trip_id,
            summary: "First run".to_string(),
            insights: vec![],
            days: vec![],
            dining: vec![],
            attractions: vec![],
            events: vec![],
            weather: vec![],
            citations: vec![],
            warnings: vec![],
            generated_by: "template".to_string(),
            generated_at: chrono::Utc::now(),
        };
        store.put(&guide).await.unwrap();

        guide.summary = "Second run".to_string();
        store.put(&guide).await.unwrap();

        let loaded = store.get(trip_id).await.unwrap().unwrap();
        assert_eq!(loaded.summary, "Second run");
    }
}
