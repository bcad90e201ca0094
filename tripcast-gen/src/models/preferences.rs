//! Canonical traveler preferences
//!
//! The single normalized preference representation consumed by generation.
//! Always fully populated: the normalizer fills every missing field with the
//! documented default, so downstream stages never branch on absence.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};

/// Restaurant price tier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PriceTier {
    Budget,
    Moderate,
    Upscale,
    Luxury,
}

impl PriceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceTier::Budget => "budget",
            PriceTier::Moderate => "moderate",
            PriceTier::Upscale => "upscale",
            PriceTier::Luxury => "luxury",
        }
    }

    /// Tolerant keyword parse used by the preference normalizer
    ///
    /// Accepts tier names plus the dollar-sign shorthand the legacy payload
    /// shape used. Unknown keywords yield None (ignored, never an error).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.trim().to_lowercase().as_str() {
            "budget" | "cheap" | "$" => Some(PriceTier::Budget),
            "moderate" | "mid" | "midrange" | "$$" => Some(PriceTier::Moderate),
            "upscale" | "$$$" => Some(PriceTier::Upscale),
            "luxury" | "$$$$" => Some(PriceTier::Luxury),
            _ => None,
        }
    }
}

/// Trip pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pace {
    Relaxed,
    Balanced,
    Packed,
}

impl Pace {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.trim().to_lowercase().as_str() {
            "relaxed" | "slow" | "leisurely" => Some(Pace::Relaxed),
            "balanced" | "moderate" | "normal" => Some(Pace::Balanced),
            "packed" | "fast" | "busy" => Some(Pace::Packed),
            _ => None,
        }
    }
}

/// Travel party composition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupType {
    Solo,
    Couple,
    Family,
    Friends,
}

impl GroupType {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.trim().to_lowercase().as_str() {
            "solo" | "single" => Some(GroupType::Solo),
            "couple" | "partner" => Some(GroupType::Couple),
            "family" | "kids" => Some(GroupType::Family),
            "friends" | "group" => Some(GroupType::Friends),
            _ => None,
        }
    }
}

/// Normalized traveler preferences
///
/// Ordered collections (BTreeSet/BTreeMap) keep `digest()` deterministic
/// for identical logical content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalPreferences {
    /// Preferred cuisine types, lowercased (empty = no constraint)
    pub cuisines: BTreeSet<String>,
    /// Acceptable restaurant price tiers (never empty)
    pub price_tiers: BTreeSet<PriceTier>,
    /// Interest flags grouped by category, e.g. interests["culture"]["museums"]
    pub interests: BTreeMap<String, BTreeMap<String, bool>>,
    pub pace: Pace,
    pub group: GroupType,
    /// 1 (low energy) to 5 (high energy)
    pub activity_level: u8,
}

impl Default for CanonicalPreferences {
    /// Documented defaults: price tiers {moderate, upscale}, balanced pace,
    /// couple group, activity level 3, no cuisine or interest constraints.
    fn default() -> Self {
        let mut price_tiers = BTreeSet::new();
        price_tiers.insert(PriceTier::Moderate);
        price_tiers.insert(PriceTier::Upscale);

        Self {
            cuisines: BTreeSet::new(),
            price_tiers,
            interests: BTreeMap::new(),
            pace: Pace::Balanced,
            group: GroupType::Couple,
            activity_level: 3,
        }
    }
}

impl CanonicalPreferences {
    /// All interest tags currently switched on, across categories
    pub fn interest_tags(&self) -> BTreeSet<String> {
        self.interests
            .values()
            .flat_map(|tags| {
                tags.iter()
                    .filter(|(_, enabled)| **enabled)
                    .map(|(tag, _)| tag.clone())
            })
            .collect()
    }

    /// Activities the itinerary schedules per day, derived from pace and
    /// activity level
    pub fn daily_activity_budget(&self) -> usize {
        let base = match self.pace {
            Pace::Relaxed => 2,
            Pace::Balanced => 3,
            Pace::Packed => 4,
        };
        base + usize::from(self.activity_level >= 4)
    }

    /// Stable digest of the enrichment-relevant preference subset
    ///
    /// Keys the enrichment cache: two preference records that would produce
    /// the same provider queries hash identically. Pace/group/activity level
    /// affect itinerary assembly only, not provider queries, so they are
    /// excluded.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for cuisine in &self.cuisines {
            hasher.update(cuisine.as_bytes());
            hasher.update([0u8]);
        }
        hasher.update([0xff]);
        for tier in &self.price_tiers {
            hasher.update(tier.as_str().as_bytes());
            hasher.update([0u8]);
        }
        hasher.update([0xff]);
        for tag in self.interest_tags() {
            hasher.update(tag.as_bytes());
            hasher.update([0u8]);
        }

        let digest = hasher.finalize();
        // 16 hex chars is plenty for a cache key component
        digest[..8].iter().map(|b| format!("{:02x}", b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_fully_populated() {
        let prefs = CanonicalPreferences::default();
        assert!(prefs.price_tiers.contains(&PriceTier::Moderate));
        assert!(prefs.price_tiers.contains(&PriceTier::Upscale));
        assert_eq!(prefs.pace, Pace::Balanced);
        assert_eq!(prefs.group, GroupType::Couple);
        assert_eq!(prefs.activity_level, 3);
    }

    #[test]
    fn digest_is_deterministic_and_order_insensitive() {
        let mut a = CanonicalPreferences::default();
        a.cuisines.insert("french".to_string());
        a.cuisines.insert("thai".to_string());

        let mut b = CanonicalPreferences::default();
        b.cuisines.insert("thai".to_string());
        b.cuisines.insert("french".to_string());

        assert_eq!(a.digest(), b.digest());
    }

    #[test]
    fn digest_ignores_assembly_only_fields() {
        let a = CanonicalPreferences::default();
        let mut b = CanonicalPreferences::default();
        b.pace = Pace::Packed;
        b.activity_level = 5;

        // Pace and activity level do not change provider queries
        assert_eq!(a.digest(), b.digest());
    }

    #[test]
    fn digest_changes_with_interest_tags() {
        let a = CanonicalPreferences::default();
        let mut b = CanonicalPreferences::default();
        b.interests
            .entry("culture".to_string())
            .or_default()
            .insert("museums".to_string(), true);

        assert_ne!(a.digest(), b.digest());
        assert!(b.interest_tags().contains("museums"));
    }

    #[test]
    fn disabled_interest_flags_are_not_tags() {
        let mut prefs = CanonicalPreferences::default();
        prefs
            .interests
            .entry("outdoors".to_string())
            .or_default()
            .insert("hiking".to_string(), false);

        assert!(prefs.interest_tags().is_empty());
    }

    #[test]
    fn price_tier_keywords() {
        assert_eq!(PriceTier::from_keyword("$$"), Some(PriceTier::Moderate));
        assert_eq!(PriceTier::from_keyword("LUXURY"), Some(PriceTier::Luxury));
        assert_eq!(PriceTier::from_keyword("mystery"), None);
    }
}
