//! The guide artifact and its building blocks

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Enrichment category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Dining,
    Attraction,
    Event,
}

impl ItemCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCategory::Dining => "dining",
            ItemCategory::Attraction => "attraction",
            ItemCategory::Event => "event",
        }
    }
}

impl std::fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recommended place or event with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedItem {
    pub name: String,
    pub address: String,
    pub category: ItemCategory,
    #[serde(default)]
    pub rating: Option<f32>,
    /// Price tier when the provider reports one (dining)
    #[serde(default)]
    pub price_tier: Option<crate::models::PriceTier>,
    /// External booking/reference URL
    #[serde(default)]
    pub url: Option<String>,
    /// Free-form descriptive tags (cuisine, interest keywords)
    #[serde(default)]
    pub tags: Vec<String>,
    /// Which provider supplied this item
    pub source: String,
}

impl EnrichedItem {
    /// Dedup key: lowercase (name, address)
    pub fn dedup_key(&self) -> (String, String) {
        (self.name.to_lowercase(), self.address.to_lowercase())
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Forecast for one itinerary day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherDay {
    pub date: NaiveDate,
    pub summary: String,
    pub high_c: f32,
    pub low_c: f32,
    #[serde(default)]
    pub precipitation_chance: Option<u8>,
}

/// Source attribution for narrative content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    pub source: String,
}

/// One scheduled activity within a day plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub title: String,
    pub category: ItemCategory,
    /// Name of the EnrichedItem this activity references, when it has one
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Ordered plan for a single trip day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayPlan {
    pub date: NaiveDate,
    /// Narrative note for the day, when the content provider supplied one
    #[serde(default)]
    pub note: Option<String>,
    pub activities: Vec<Activity>,
}

/// The final guide artifact
///
/// Immutable once written; a later successful run replaces the stored guide
/// wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Guide {
    pub trip_id: Uuid,
    pub summary: String,
    #[serde(default)]
    pub insights: Vec<String>,
    pub days: Vec<DayPlan>,
    #[serde(default)]
    pub dining: Vec<EnrichedItem>,
    #[serde(default)]
    pub attractions: Vec<EnrichedItem>,
    #[serde(default)]
    pub events: Vec<EnrichedItem>,
    #[serde(default)]
    pub weather: Vec<WeatherDay>,
    #[serde(default)]
    pub citations: Vec<Citation>,
    /// Warnings accumulated from degraded enrichment categories
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Content provider that produced the narrative sections
    pub generated_by: String,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}
