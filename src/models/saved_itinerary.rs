use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::recommendation::ItineraryDay;

/// A finished itinerary the traveler chose to keep, stored per identity
/// under an opaque id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedItinerary {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Opaque identifier handed to the client; the Mongo `_id` stays internal.
    pub saved_id: String,
    pub user_id: ObjectId,
    pub destination: String,
    pub date: String,
    pub places: Vec<String>,
    pub hotel: String,
    pub itinerary: Vec<ItineraryDay>,
    pub timestamp: DateTime<Utc>,
}

/// Client payload for POST /api/itineraries/save.
#[derive(Debug, Deserialize)]
pub struct SaveItineraryRequest {
    pub destination: String,
    pub date: String,
    #[serde(default)]
    pub places: Vec<String>,
    pub hotel: String,
    #[serde(default)]
    pub itinerary: Vec<ItineraryDay>,
}
