//! Trip facts consumed by the generation pipeline

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Inclusive trip date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Itinerary days, oldest first, inclusive of both endpoints
    ///
    /// Capped at 30 days; a reversed range yields no days (the itinerary
    /// assembler rejects it as unusable input).
    pub fn days(&self) -> Vec<NaiveDate> {
        let mut days = Vec::new();
        let mut current = self.start;
        while current <= self.end && days.len() < 30 {
            days.push(current);
            current = match current.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }
        days
    }

    pub fn len_days(&self) -> usize {
        self.days().len()
    }
}

/// One flight segment from the traveler's documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightLeg {
    pub carrier: String,
    pub flight_number: String,
    pub departure: String,
    pub arrival: String,
    #[serde(default)]
    pub departs_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// One hotel stay from the traveler's documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelStay {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub check_in: Option<NaiveDate>,
    #[serde(default)]
    pub check_out: Option<NaiveDate>,
}

/// Structured trip facts, the pipeline's primary input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripFacts {
    pub destination: String,
    pub date_range: DateRange,
    pub traveler_count: u32,
    #[serde(default)]
    pub flights: Vec<FlightLeg>,
    #[serde(default)]
    pub hotels: Vec<HotelStay>,
}
