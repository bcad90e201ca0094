//! Itinerary assembly
//!
//! Merges narrative content, enriched item collections, and weather into the
//! final guide artifact. This is the only stage whose failure is fatal to a
//! run: a trip whose date range yields no itinerary days cannot produce a
//! guide.

use crate::models::{
    Activity, CanonicalPreferences, DayPlan, EnrichedItem, Guide, ItemCategory, TripFacts,
    WeatherDay,
};
use crate::providers::GeneratedContent;
use std::collections::VecDeque;
use thiserror::Error;
use uuid::Uuid;

/// Fatal assembly errors
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("trip date range yields no itinerary days")]
    NoItineraryDays,
}

/// Assemble the final guide from all pipeline outputs
#[allow(clippy::too_many_arguments)]
pub fn assemble_guide(
    trip_id: Uuid,
    facts: &TripFacts,
    prefs: &CanonicalPreferences,
    content: GeneratedContent,
    provider: &str,
    dining: Vec<EnrichedItem>,
    attractions: Vec<EnrichedItem>,
    events: Vec<EnrichedItem>,
    weather: Vec<WeatherDay>,
    warnings: Vec<String>,
) -> Result<Guide, AssemblyError> {
    let dates = facts.date_range.days();
    if dates.is_empty() {
        return Err(AssemblyError::NoItineraryDays);
    }

    let mut dining_queue: VecDeque<&EnrichedItem> = dining.iter().collect();
    let mut attraction_queue: VecDeque<&EnrichedItem> = attractions.iter().collect();
    let mut event_queue: VecDeque<&EnrichedItem> = events.iter().collect();

    let budget = prefs.daily_activity_budget();
    let days = dates
        .iter()
        .enumerate()
        .map(|(index, date)| {
            let mut activities = Vec::with_capacity(budget);

            for slot in day_slots(budget) {
                let activity = match slot {
                    ItemCategory::Attraction => attraction_queue
                        .pop_front()
                        .map(|item| visit_activity(item)),
                    ItemCategory::Dining => {
                        dining_queue.pop_front().map(|item| dining_activity(item, &activities))
                    }
                    // An empty event calendar falls back to another attraction
                    ItemCategory::Event => event_queue
                        .pop_front()
                        .map(|item| attend_activity(item))
                        .or_else(|| attraction_queue.pop_front().map(visit_activity)),
                };
                if let Some(activity) = activity {
                    activities.push(activity);
                }
            }

            // Thin item collections must not leave a day empty
            if activities.is_empty() {
                activities.push(Activity {
                    title: format!("Explore {} at your own pace", facts.destination),
                    category: ItemCategory::Attraction,
                    item_name: None,
                    note: None,
                });
            }

            DayPlan {
                date: *date,
                note: content.day_notes.get(index).cloned(),
                activities,
            }
        })
        .collect();

    Ok(Guide {
        trip_id,
        summary: content.summary,
        insights: content.insights,
        days,
        dining,
        attractions,
        events,
        weather,
        citations: content.citations,
        warnings,
        generated_by: provider.to_string(),
        generated_at: chrono::Utc::now(),
    })
}

/// Slot pattern for one day given the activity budget
fn day_slots(budget: usize) -> Vec<ItemCategory> {
    let mut slots = vec![ItemCategory::Attraction, ItemCategory::Dining];
    if budget >= 3 {
        slots.push(ItemCategory::Event);
    }
    if budget >= 4 {
        slots.push(ItemCategory::Dining);
    }
    if budget >= 5 {
        slots.push(ItemCategory::Attraction);
    }
    slots
}

fn visit_activity(item: &EnrichedItem) -> Activity {
    Activity {
        title: format!("Visit {}", item.name),
        category: ItemCategory::Attraction,
        item_name: Some(item.name.clone()),
        note: None,
    }
}

fn dining_activity(item: &EnrichedItem, scheduled: &[Activity]) -> Activity {
    let meal = if scheduled
        .iter()
        .any(|a| a.category == ItemCategory::Dining)
    {
        "Dinner"
    } else {
        "Lunch"
    };
    Activity {
        title: format!("{} at {}", meal, item.name),
        category: ItemCategory::Dining,
        item_name: Some(item.name.clone()),
        note: None,
    }
}

fn attend_activity(item: &EnrichedItem) -> Activity {
    Activity {
        title: format!("Attend {}", item.name),
        category: ItemCategory::Event,
        item_name: Some(item.name.clone()),
        note: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DateRange;
    use crate::providers::TemplateProvider;
    use chrono::NaiveDate;

    fn facts(days: u64) -> TripFacts {
        let start = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        TripFacts {
            destination: "Paris, France".to_string(),
            date_range: DateRange {
                start,
                end: start + chrono::Duration::days(days as i64 - 1),
            },
            traveler_count: 2,
            flights: vec![],
            hotels: vec![],
        }
    }

    fn item(name: &str, category: ItemCategory, tags: &[&str]) -> EnrichedItem {
        EnrichedItem {
            name: name.to_string(),
            address: format!("{} address", name),
            category,
            rating: Some(4.2),
            price_tier: None,
            url: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            source: "mock".to_string(),
        }
    }

    fn assemble(
        facts: &TripFacts,
        prefs: &CanonicalPreferences,
        dining: Vec<EnrichedItem>,
        attractions: Vec<EnrichedItem>,
        events: Vec<EnrichedItem>,
    ) -> Result<Guide, AssemblyError> {
        let content = TemplateProvider::render(facts, prefs);
        assemble_guide(
            Uuid::new_v4(),
            facts,
            prefs,
            content,
            "template",
            dining,
            attractions,
            events,
            vec![],
            vec![],
        )
    }

    #[test]
    fn one_day_plan_per_trip_day() {
        let facts = facts(3);
        let guide = assemble(
            &facts,
            &CanonicalPreferences::default(),
            vec![item("Bistro A", ItemCategory::Dining, &[])],
            vec![item("Louvre", ItemCategory::Attraction, &["museums"])],
            vec![],
        )
        .unwrap();

        assert_eq!(guide.days.len(), 3);
        assert!(guide.days.iter().all(|d| !d.activities.is_empty()));
        // Days are ordered
        assert!(guide.days.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn scheduled_activities_reference_enriched_items() {
        let facts = facts(2);
        let guide = assemble(
            &facts,
            &CanonicalPreferences::default(),
            vec![item("Bistro A", ItemCategory::Dining, &[])],
            vec![item("Louvre", ItemCategory::Attraction, &["museums"])],
            vec![],
        )
        .unwrap();

        let first_day = &guide.days[0];
        assert_eq!(first_day.activities[0].item_name.as_deref(), Some("Louvre"));
        assert!(first_day.activities[0].title.contains("Visit"));
        assert_eq!(
            first_day.activities[1].item_name.as_deref(),
            Some("Bistro A")
        );
    }

    #[test]
    fn empty_collections_still_fill_every_day() {
        let facts = facts(4);
        let guide = assemble(&facts, &CanonicalPreferences::default(), vec![], vec![], vec![])
            .unwrap();

        for day in &guide.days {
            assert_eq!(day.activities.len(), 1);
            assert!(day.activities[0].title.contains("Explore"));
        }
    }

    #[test]
    fn reversed_date_range_is_fatal() {
        let mut facts = facts(1);
        facts.date_range.end = facts.date_range.start - chrono::Duration::days(2);

        let result = assemble(&facts, &CanonicalPreferences::default(), vec![], vec![], vec![]);
        assert!(matches!(result, Err(AssemblyError::NoItineraryDays)));
    }

    #[test]
    fn packed_pace_schedules_more_activities() {
        let mut prefs = CanonicalPreferences::default();
        prefs.pace = crate::models::Pace::Packed;
        prefs.activity_level = 5;

        let facts = facts(1);
        let dining = vec![
            item("Bistro A", ItemCategory::Dining, &[]),
            item("Bistro B", ItemCategory::Dining, &[]),
        ];
        let attractions = vec![
            item("Louvre", ItemCategory::Attraction, &[]),
            item("Orsay", ItemCategory::Attraction, &[]),
        ];
        let events = vec![item("Jazz Night", ItemCategory::Event, &[])];

        let guide = assemble(&facts, &prefs, dining, attractions, events).unwrap();
        assert_eq!(guide.days[0].activities.len(), 5);

        // Second dining slot reads as dinner
        let dinners: Vec<&Activity> = guide.days[0]
            .activities
            .iter()
            .filter(|a| a.title.starts_with("Dinner"))
            .collect();
        assert_eq!(dinners.len(), 1);
    }

    #[test]
    fn day_notes_attach_in_order() {
        let facts = facts(3);
        let guide = assemble(&facts, &CanonicalPreferences::default(), vec![], vec![], vec![])
            .unwrap();
        assert!(guide.days[0].note.as_deref().unwrap().contains("Arrive"));
        assert!(guide.days[2].note.as_deref().unwrap().contains("depart"));
    }
}
