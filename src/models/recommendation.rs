use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::trip::TripSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecKind {
    Places,
    Hotels,
    Itinerary,
    Packing,
}

impl RecKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Places => "places",
            Self::Hotels => "hotels",
            Self::Itinerary => "itinerary",
            Self::Packing => "packing",
        }
    }
}

impl fmt::Display for RecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "places" => Ok(Self::Places),
            "hotels" => Ok(Self::Hotels),
            "itinerary" => Ok(Self::Itinerary),
            "packing" => Ok(Self::Packing),
            _ => Err(()),
        }
    }
}

// Wire records below carry the exact field names the model is instructed to
// emit. Every field defaults so a partially filled object still decodes; the
// prompt, not the decoder, is the schema enforcement.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Place {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub timing: String,
    #[serde(default)]
    pub ticket: String,
    #[serde(default)]
    pub who_can_visit: String,
    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hotel {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub room_type: String,
    #[serde(default)]
    pub price_per_person: String,
    #[serde(default)]
    pub food: String,
    #[serde(default)]
    pub companion_type: String,
    #[serde(default)]
    pub budget: String,
    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItineraryActivity {
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub activity: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, rename = "mapUrl")]
    pub map_url: String,
    #[serde(default, rename = "transportOptions")]
    pub transport_options: Vec<String>,
    #[serde(default, rename = "foodSuggestions")]
    pub food_suggestions: Vec<String>,
    #[serde(default, rename = "souvenirSuggestions")]
    pub souvenir_suggestions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItineraryDay {
    #[serde(default)]
    pub day: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub hotel: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub activities: Vec<ItineraryActivity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackingListPayload {
    pub categories: Vec<PackingCategoryPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tips: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackingCategoryPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "lowercase")]
pub enum RecommendationItems {
    Places(Vec<Place>),
    Hotels(Vec<Hotel>),
    Itinerary(Vec<ItineraryDay>),
    Packing(PackingListPayload),
}

impl RecommendationItems {
    pub fn kind(&self) -> RecKind {
        match self {
            Self::Places(_) => RecKind::Places,
            Self::Hotels(_) => RecKind::Hotels,
            Self::Itinerary(_) => RecKind::Itinerary,
            Self::Packing(_) => RecKind::Packing,
        }
    }

    /// The bare wire payload: an array for places/hotels/itinerary, an
    /// object for the packing list. What route responses hand to the client.
    pub fn payload_json(&self) -> serde_json::Value {
        let result = match self {
            Self::Places(places) => serde_json::to_value(places),
            Self::Hotels(hotels) => serde_json::to_value(hotels),
            Self::Itinerary(days) => serde_json::to_value(days),
            Self::Packing(payload) => serde_json::to_value(payload),
        };
        result.unwrap_or(serde_json::Value::Null)
    }

    /// Item names already shown to the traveler; used to exclude repeats
    /// from a "show more" batch.
    pub fn names(&self) -> Vec<String> {
        match self {
            Self::Places(places) => places.iter().map(|p| p.name.clone()).collect(),
            Self::Hotels(hotels) => hotels.iter().map(|h| h.name.clone()).collect(),
            Self::Itinerary(_) | Self::Packing(_) => Vec::new(),
        }
    }
}

/// The result of one successful prompt → gateway → extractor cycle.
/// Superseded, never mutated, by a later set of the same kind; the snapshot
/// it was requested with is immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub kind: RecKind,
    pub items: RecommendationItems,
    pub source_snapshot: TripSnapshot,
    pub fetched_at: DateTime<Utc>,
}

impl RecommendationSet {
    pub fn new(items: RecommendationItems, source_snapshot: TripSnapshot) -> Self {
        Self {
            kind: items.kind(),
            items,
            source_snapshot,
            fetched_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rec_kind_round_trips_through_str() {
        for kind in [RecKind::Places, RecKind::Hotels, RecKind::Itinerary, RecKind::Packing] {
            assert_eq!(kind.as_str().parse::<RecKind>(), Ok(kind));
        }
        assert!("weather".parse::<RecKind>().is_err());
    }

    #[test]
    fn place_decodes_with_missing_fields() {
        let place: Place = serde_json::from_str(r#"{"name": "Baga Beach"}"#).unwrap();
        assert_eq!(place.name, "Baga Beach");
        assert_eq!(place.ticket, "");
    }

    #[test]
    fn itinerary_activity_uses_camel_case_wire_names() {
        let activity: ItineraryActivity = serde_json::from_str(
            r#"{"time": "09:00", "activity": "Fort walk", "transportOptions": ["cab"], "foodSuggestions": ["poha"]}"#,
        )
        .unwrap();
        assert_eq!(activity.transport_options, vec!["cab"]);
        assert_eq!(activity.food_suggestions, vec!["poha"]);
    }
}
