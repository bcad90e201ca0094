//! SQLite store integration tests

use chrono::NaiveDate;
use tripcast_gen::db;
use tripcast_gen::models::{DateRange, DayPlan, Guide, TripFacts};
use tripcast_gen::store::{GuideStore, SqliteGuideStore, SqliteTripStore, TripStore};
use uuid::Uuid;

async fn temp_pool() -> (sqlx::SqlitePool, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let pool = db::init_database_pool(&dir.path().join("tripcast.db"))
        .await
        .unwrap();
    (pool, dir)
}

fn facts() -> TripFacts {
    TripFacts {
        destination: "Rome, Italy".to_string(),
        date_range: DateRange {
            start: NaiveDate::from_ymd_opt(2026, 10, 2).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 10, 5).unwrap(),
        },
        traveler_count: 3,
        flights: vec![],
        hotels: vec![],
    }
}

fn guide(trip_id: Uuid, summary: &str) -> Guide {
    Guide {
        trip_id,
        summary: summary.to_string(),
        insights: vec!["Carry coins for fountains".to_string()],
        days: vec![DayPlan {
            date: NaiveDate::from_ymd_opt(2026, 10, 2).unwrap(),
            note: None,
            activities: vec![],
        }],
        dining: vec![],
        attractions: vec![],
        events: vec![],
        weather: vec![],
        citations: vec![],
        warnings: vec![],
        generated_by: "template".to_string(),
        generated_at: chrono::Utc::now(),
    }
}

#[tokio::test]
async fn trip_store_round_trip() {
    let (pool, _dir) = temp_pool().await;
    let store = SqliteTripStore::new(pool);
    let trip_id = Uuid::new_v4();

    assert!(store.get(trip_id).await.unwrap().is_none());

    store.put(trip_id, &facts()).await.unwrap();
    let loaded = store.get(trip_id).await.unwrap().unwrap();
    assert_eq!(loaded.destination, "Rome, Italy");
    assert_eq!(loaded.traveler_count, 3);
    assert_eq!(loaded.date_range.len_days(), 4);

    store.delete(trip_id).await.unwrap();
    assert!(store.get(trip_id).await.unwrap().is_none());
}

#[tokio::test]
async fn trip_upsert_replaces_facts() {
    let (pool, _dir) = temp_pool().await;
    let store = SqliteTripStore::new(pool);
    let trip_id = Uuid::new_v4();

    store.put(trip_id, &facts()).await.unwrap();

    let mut updated = facts();
    updated.traveler_count = 5;
    store.put(trip_id, &updated).await.unwrap();

    let loaded = store.get(trip_id).await.unwrap().unwrap();
    assert_eq!(loaded.traveler_count, 5);
}

#[tokio::test]
async fn guide_store_round_trip_and_overwrite() {
    let (pool, _dir) = temp_pool().await;
    let store = SqliteGuideStore::new(pool);
    let trip_id = Uuid::new_v4();

    assert!(store.get(trip_id).await.unwrap().is_none());

    store.put(&guide(trip_id, "First run")).await.unwrap();
    let loaded = store.get(trip_id).await.unwrap().unwrap();
    assert_eq!(loaded.summary, "First run");
    assert_eq!(loaded.days.len(), 1);

    // A later run replaces the artifact wholesale
    store.put(&guide(trip_id, "Second run")).await.unwrap();
    let loaded = store.get(trip_id).await.unwrap().unwrap();
    assert_eq!(loaded.summary, "Second run");

    store.delete(trip_id).await.unwrap();
    assert!(store.get(trip_id).await.unwrap().is_none());
}

#[tokio::test]
async fn guides_for_different_trips_are_independent() {
    let (pool, _dir) = temp_pool().await;
    let store = SqliteGuideStore::new(pool);
    let trip_a = Uuid::new_v4();
    let trip_b = Uuid::new_v4();

    store.put(&guide(trip_a, "Guide A")).await.unwrap();
    store.put(&guide(trip_b, "Guide B")).await.unwrap();

    assert_eq!(store.get(trip_a).await.unwrap().unwrap().summary, "Guide A");
    assert_eq!(store.get(trip_b).await.unwrap().unwrap().summary, "Guide B");
}
