//! Preference normalization
//!
//! Maps the historically-accepted client preference payload shapes (the
//! older flat format and the newer nested format) into one
//! CanonicalPreferences record. Total and deterministic: unknown fields are
//! ignored, missing fields receive the documented defaults, and no payload
//! content can make normalization fail. The API handler rejects non-object
//! payloads before this function runs; given any JSON object (including an
//! empty one) the result is fully populated.

use crate::models::{CanonicalPreferences, GroupType, Pace, PriceTier};
use serde_json::Value;
use std::collections::BTreeSet;

/// Normalize a raw preference payload into CanonicalPreferences
pub fn normalize(payload: &Value) -> CanonicalPreferences {
    let mut prefs = CanonicalPreferences::default();

    let obj = match payload.as_object() {
        Some(obj) => obj,
        None => return prefs,
    };

    // Cuisines: modern `dining.cuisines`, legacy `cuisineTypes` / `cuisines`
    let cuisine_values = obj
        .get("dining")
        .and_then(|d| d.get("cuisines"))
        .or_else(|| obj.get("cuisineTypes"))
        .or_else(|| obj.get("cuisines"));
    if let Some(values) = cuisine_values {
        prefs.cuisines = string_list(values)
            .into_iter()
            .map(|c| c.to_lowercase())
            .collect();
    }

    // Price tiers: modern `dining.priceTiers`, legacy `priceTier` /
    // `priceRange` (single keyword or list, dollar signs accepted)
    let tier_values = obj
        .get("dining")
        .and_then(|d| d.get("priceTiers").or_else(|| d.get("price_tiers")))
        .or_else(|| obj.get("priceTiers"))
        .or_else(|| obj.get("priceTier"))
        .or_else(|| obj.get("priceRange"));
    if let Some(values) = tier_values {
        let tiers: BTreeSet<PriceTier> = string_list(values)
            .iter()
            .filter_map(|k| PriceTier::from_keyword(k))
            .collect();
        // An unparseable tier list falls back to the default, never empty
        if !tiers.is_empty() {
            prefs.price_tiers = tiers;
        }
    }

    // Interests: modern nested map (category -> tag -> bool), legacy flat
    // list of tag keywords (grouped under "general")
    match obj.get("interests") {
        Some(Value::Object(categories)) => {
            for (category, tags) in categories {
                if let Value::Object(tag_map) = tags {
                    let entry = prefs.interests.entry(category.to_lowercase()).or_default();
                    for (tag, enabled) in tag_map {
                        // Non-boolean flags count as enabled when truthy
                        let on = match enabled {
                            Value::Bool(b) => *b,
                            Value::Number(n) => n.as_f64().unwrap_or(0.0) != 0.0,
                            Value::String(s) => !s.is_empty(),
                            _ => false,
                        };
                        entry.insert(tag.to_lowercase(), on);
                    }
                }
            }
        }
        Some(list @ Value::Array(_)) => {
            let entry = prefs.interests.entry("general".to_string()).or_default();
            for tag in string_list(list) {
                entry.insert(tag.to_lowercase(), true);
            }
        }
        _ => {}
    }

    // Pace: modern `pace`, legacy `travelStyle`
    if let Some(keyword) = obj
        .get("pace")
        .or_else(|| obj.get("travelStyle"))
        .and_then(Value::as_str)
    {
        if let Some(pace) = Pace::from_keyword(keyword) {
            prefs.pace = pace;
        }
    }

    // Group: modern `group`, legacy `groupType`
    if let Some(keyword) = obj
        .get("group")
        .or_else(|| obj.get("groupType"))
        .and_then(Value::as_str)
    {
        if let Some(group) = GroupType::from_keyword(keyword) {
            prefs.group = group;
        }
    }

    // Activity level: number or numeric string, clamped to 1-5
    if let Some(level) = obj
        .get("activityLevel")
        .or_else(|| obj.get("activity_level"))
    {
        let parsed = match level {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        if let Some(value) = parsed {
            prefs.activity_level = (value.round() as i64).clamp(1, 5) as u8;
        }
    }

    prefs
}

/// Collect strings from a JSON value that may be a single string or an array
fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
