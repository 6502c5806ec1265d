use std::error::Error;
use std::fmt;
use std::sync::Arc;

use log::{info, warn};
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Client;
use serde_json::Value;

use crate::models::packing::{PackingChecklist, StoredPackingList};
use crate::models::recommendation::{
    Hotel, ItineraryDay, PackingListPayload, Place, RecKind, RecommendationItems,
    RecommendationSet,
};
use crate::models::trip::TripSnapshot;
use crate::services::chat_gateway::{ChatGateway, ChatMessage, GatewayError};
use crate::services::extractor::{self, ExtractionError};
use crate::services::prompt::{self, PromptExtras, SYSTEM_PROMPT};
use crate::services::session_store::{SessionState, SessionStore};
use crate::services::staleness;

const PACKING_COLLECTION: &str = "PackingLists";

#[derive(Debug)]
pub enum FetchError {
    /// A fetch for this (session, kind) is already running.
    InFlight,
    Gateway(GatewayError),
    Extraction(ExtractionError),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::InFlight => write!(f, "fetch already in progress"),
            FetchError::Gateway(err) => write!(f, "gateway: {}", err),
            FetchError::Extraction(err) => write!(f, "extraction: {}", err),
        }
    }
}

impl Error for FetchError {}

impl From<GatewayError> for FetchError {
    fn from(err: GatewayError) -> Self {
        FetchError::Gateway(err)
    }
}

impl From<ExtractionError> for FetchError {
    fn from(err: ExtractionError) -> Self {
        FetchError::Extraction(err)
    }
}

impl FetchError {
    /// The message shown to the traveler. Raw model text never appears here;
    /// it only goes to the log.
    pub fn user_message(&self, kind: RecKind) -> String {
        match self {
            FetchError::InFlight => {
                format!("A {} request is already in progress. Please wait.", kind)
            }
            FetchError::Gateway(_) => "Failed to fetch, please try again.".to_string(),
            FetchError::Extraction(_) => match kind {
                RecKind::Places => {
                    "Could not parse the place recommendations. Please try again.".to_string()
                }
                RecKind::Hotels => {
                    "Could not parse the hotel suggestions. Please try again.".to_string()
                }
                RecKind::Itinerary => {
                    "Could not parse the itinerary. Please try again.".to_string()
                }
                RecKind::Packing => {
                    "Could not parse the packing list. Please try again.".to_string()
                }
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub set: RecommendationSet,
    pub from_cache: bool,
}

/// Sequences prompt builder → chat gateway → extractor for one kind,
/// applying the staleness verdict and updating the store on success only.
/// Failures leave the previous set, if any, untouched, and there is no
/// automatic retry; the client owns the retry action.
#[derive(Clone)]
pub struct Orchestrator {
    store: Arc<SessionStore>,
    gateway: ChatGateway,
    mongo: Arc<Client>,
}

impl Orchestrator {
    pub fn new(store: Arc<SessionStore>, gateway: ChatGateway, mongo: Arc<Client>) -> Self {
        Self {
            store,
            gateway,
            mongo,
        }
    }

    pub async fn fetch(
        &self,
        kind: RecKind,
        session: &str,
        user_id: Option<ObjectId>,
        more: bool,
    ) -> Result<FetchOutcome, FetchError> {
        if !self.store.begin_fetch(session, kind) {
            return Err(FetchError::InFlight);
        }
        let result = self.fetch_inner(kind, session, user_id, more).await;
        self.store.finish_fetch(session, kind);
        result
    }

    async fn fetch_inner(
        &self,
        kind: RecKind,
        session: &str,
        user_id: Option<ObjectId>,
        more: bool,
    ) -> Result<FetchOutcome, FetchError> {
        let state = self.store.state(session);
        let snapshot =
            TripSnapshot::capture(&state.trip, &state.selections, state.itinerary_generated);

        // A traveler who generated a packing list for this destination and
        // start date before gets it back without a model call.
        if kind == RecKind::Packing {
            if let Some(user_id) = user_id {
                if let Some(stored) = self.lookup_stored_packing(user_id, &snapshot).await {
                    let set = RecommendationSet::new(
                        RecommendationItems::Packing(stored.checklist.to_payload()),
                        snapshot,
                    );
                    self.store.set_packing(session, stored.checklist);
                    self.store.store_recommendation(session, set.clone());
                    return Ok(FetchOutcome {
                        set,
                        from_cache: true,
                    });
                }
            }
        }

        if !more {
            let last = self.store.snapshot(session, kind);
            if !staleness::should_refresh(kind, &snapshot, last.as_ref()) {
                if let Some(cached) = self.store.recommendation(session, kind) {
                    return Ok(FetchOutcome {
                        set: cached,
                        from_cache: true,
                    });
                }
            }
        }

        let extras = build_extras(kind, &state, more);
        let prompt_text = prompt::build_prompt(kind, &state.trip, &extras);
        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(prompt_text),
        ];

        let reply = self.gateway.send(&messages).await?;
        let mut items = decode_items(kind, &reply)?;

        if more {
            if let Some(existing) = self.store.recommendation(session, kind) {
                items = append_items(existing.items, items);
            }
        }

        if let RecommendationItems::Packing(payload) = &items {
            let checklist = PackingChecklist::from_payload(payload);
            self.store.set_packing(session, checklist.clone());
            if let Some(user_id) = user_id {
                self.write_through_packing(user_id, &snapshot, checklist).await;
            }
        }

        let set = RecommendationSet::new(items, snapshot);
        if !self.store.store_recommendation(session, set.clone()) {
            // The session was cleared while the round trip was in flight;
            // the completed result is discarded, not written.
            info!(
                "Session {} was cleared during a {} fetch; result discarded",
                session, kind
            );
        }

        Ok(FetchOutcome {
            set,
            from_cache: false,
        })
    }

    async fn lookup_stored_packing(
        &self,
        user_id: ObjectId,
        snapshot: &TripSnapshot,
    ) -> Option<StoredPackingList> {
        let (destination, start_date) = packing_key(snapshot)?;
        let collection: mongodb::Collection<StoredPackingList> =
            self.mongo.database("Travelers").collection(PACKING_COLLECTION);

        match collection
            .find_one(doc! {
                "user_id": user_id,
                "destination": &destination,
                "start_date": &start_date,
            })
            .await
        {
            Ok(found) => found,
            Err(err) => {
                warn!("Packing list lookup failed, falling back to a fresh fetch: {:?}", err);
                None
            }
        }
    }

    async fn write_through_packing(
        &self,
        user_id: ObjectId,
        snapshot: &TripSnapshot,
        checklist: PackingChecklist,
    ) {
        let Some((destination, start_date)) = packing_key(snapshot) else {
            return;
        };
        let collection: mongodb::Collection<StoredPackingList> =
            self.mongo.database("Travelers").collection(PACKING_COLLECTION);

        let checklist_bson = match mongodb::bson::to_bson(&checklist) {
            Ok(bson) => bson,
            Err(err) => {
                warn!("Failed to serialize packing checklist: {:?}", err);
                return;
            }
        };

        let now = mongodb::bson::DateTime::now();
        let result = collection
            .update_one(
                doc! {
                    "user_id": user_id,
                    "destination": &destination,
                    "start_date": &start_date,
                },
                doc! {
                    "$set": {
                        "checklist": checklist_bson,
                        "updated_at": now,
                    },
                    "$setOnInsert": {
                        "created_at": now,
                    },
                },
            )
            .upsert(true)
            .await;

        if let Err(err) = result {
            // Durable write-through is best effort; the session copy stands.
            warn!("Failed to persist packing list: {:?}", err);
        }
    }
}

fn packing_key(snapshot: &TripSnapshot) -> Option<(String, String)> {
    let destination = snapshot.destination.clone()?;
    let start_date = snapshot.start_date?.format("%Y-%m-%d").to_string();
    Some((destination, start_date))
}

fn build_extras(kind: RecKind, state: &SessionState, more: bool) -> PromptExtras {
    match kind {
        RecKind::Places | RecKind::Hotels => PromptExtras {
            exclude_names: if more {
                state
                    .recommendations
                    .get(&kind)
                    .map(|set| set.items.names())
                    .unwrap_or_default()
            } else {
                Vec::new()
            },
            ..Default::default()
        },
        RecKind::Itinerary => PromptExtras {
            selected_places: state.selections.places.clone(),
            chosen_hotel: state.selections.hotel.clone(),
            exclude_names: Vec::new(),
        },
        RecKind::Packing => PromptExtras::default(),
    }
}

fn decode_items(kind: RecKind, reply: &str) -> Result<RecommendationItems, ExtractionError> {
    match kind {
        RecKind::Places => {
            let values = extractor::extract_array(reply)?;
            let places: Vec<Place> = serde_json::from_value(Value::Array(values))
                .map_err(|_| ExtractionError::shape_mismatch(reply))?;
            Ok(RecommendationItems::Places(places))
        }
        RecKind::Hotels => {
            let values = extractor::extract_array(reply)?;
            let hotels: Vec<Hotel> = serde_json::from_value(Value::Array(values))
                .map_err(|_| ExtractionError::shape_mismatch(reply))?;
            Ok(RecommendationItems::Hotels(hotels))
        }
        RecKind::Itinerary => {
            let values = extractor::extract_array(reply)?;
            let days: Vec<ItineraryDay> = serde_json::from_value(Value::Array(values))
                .map_err(|_| ExtractionError::shape_mismatch(reply))?;
            Ok(RecommendationItems::Itinerary(days))
        }
        RecKind::Packing => {
            let map = extractor::extract_object(reply, Some("categories"))?;
            let payload: PackingListPayload = serde_json::from_value(Value::Object(map))
                .map_err(|_| ExtractionError::shape_mismatch(reply))?;
            Ok(RecommendationItems::Packing(payload))
        }
    }
}

/// Show More appends the new batch after what the traveler has already
/// seen; the prompt's exclusion list keeps repeats out.
fn append_items(
    existing: RecommendationItems,
    fresh: RecommendationItems,
) -> RecommendationItems {
    match (existing, fresh) {
        (RecommendationItems::Places(mut seen), RecommendationItems::Places(new)) => {
            seen.extend(new);
            RecommendationItems::Places(seen)
        }
        (RecommendationItems::Hotels(mut seen), RecommendationItems::Hotels(new)) => {
            seen.extend(new);
            RecommendationItems::Hotels(seen)
        }
        (_, fresh) => fresh,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::trip::{SelectionSet, TripContext, TripContextUpdate};

    #[test]
    fn decode_items_maps_each_kind() {
        let places = decode_items(RecKind::Places, r#"[{"name": "Baga Beach"}]"#).unwrap();
        assert!(matches!(places, RecommendationItems::Places(ref p) if p.len() == 1));

        let packing = decode_items(
            RecKind::Packing,
            r#"{"categories": [{"name": "Clothes", "items": ["Hat"]}], "tips": "pack light"}"#,
        )
        .unwrap();
        match packing {
            RecommendationItems::Packing(payload) => {
                assert_eq!(payload.categories[0].items, vec!["Hat"]);
                assert_eq!(payload.tips.as_deref(), Some("pack light"));
            }
            other => panic!("unexpected items: {:?}", other),
        }
    }

    #[test]
    fn decode_rejects_wrong_shape() {
        assert!(decode_items(RecKind::Places, r#"{"name": "not a list"}"#).is_err());
        assert!(decode_items(RecKind::Packing, r#"{"tips": "no categories"}"#).is_err());
    }

    #[test]
    fn append_concatenates_same_kind() {
        let seen = RecommendationItems::Places(vec![Place {
            name: "A".to_string(),
            ..Default::default()
        }]);
        let fresh = RecommendationItems::Places(vec![Place {
            name: "B".to_string(),
            ..Default::default()
        }]);
        match append_items(seen, fresh) {
            RecommendationItems::Places(places) => {
                assert_eq!(places.len(), 2);
                assert_eq!(places[1].name, "B");
            }
            other => panic!("unexpected items: {:?}", other),
        }
    }

    #[test]
    fn itinerary_extras_carry_selections() {
        let mut state = SessionState::default();
        state.trip = {
            let mut trip = TripContext::default();
            trip.apply(TripContextUpdate {
                destination: Some("Goa".to_string()),
                ..Default::default()
            });
            trip
        };
        state.selections = SelectionSet {
            places: vec!["Baga Beach".to_string()],
            hotel: Some("Hotel Sunrise".to_string()),
        };
        let extras = build_extras(RecKind::Itinerary, &state, false);
        assert_eq!(extras.selected_places, vec!["Baga Beach"]);
        assert_eq!(extras.chosen_hotel.as_deref(), Some("Hotel Sunrise"));
    }

    #[test]
    fn user_messages_are_kind_specific_for_extraction() {
        let err = FetchError::Extraction(ExtractionError::shape_mismatch("nope"));
        assert!(err.user_message(RecKind::Packing).contains("packing list"));
        assert!(err.user_message(RecKind::Places).contains("place"));
        let err = FetchError::Gateway(GatewayError::EnvironmentError("x".to_string()));
        assert_eq!(err.user_message(RecKind::Places), "Failed to fetch, please try again.");
    }
}
