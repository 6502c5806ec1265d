use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::models::packing::PackingChecklist;
use crate::models::recommendation::{RecKind, RecommendationSet};
use crate::models::trip::{SelectionSet, TripContext, TripContextUpdate, TripSnapshot};

/// The storage keys a mutation can touch, mirroring what the wizard keeps
/// per browsing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKey {
    Trip,
    SelectedPlaces,
    SelectedHotel,
    CategoryPlaces,
    HotelOptions,
    Itinerary,
    ItineraryGenerated,
    PackingCategories,
    PackingItems,
}

impl StoreKey {
    fn for_kind(kind: RecKind) -> Self {
        match kind {
            RecKind::Places => Self::CategoryPlaces,
            RecKind::Hotels => Self::HotelOptions,
            RecKind::Itinerary => Self::Itinerary,
            RecKind::Packing => Self::PackingCategories,
        }
    }
}

/// Mutation notification, fired synchronously at the point of mutation.
/// Replaces the storage-polling timer the wizard used for change detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent<'a> {
    Updated { session: &'a str, key: StoreKey },
    Cleared { session: &'a str },
}

pub type StoreObserver = Arc<dyn Fn(&StoreEvent<'_>) + Send + Sync>;

/// Everything one browsing session accumulates.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub trip: TripContext,
    pub selections: SelectionSet,
    pub itinerary_generated: bool,
    pub recommendations: HashMap<RecKind, RecommendationSet>,
    /// Snapshot used for the last successful fetch of each kind; what the
    /// staleness detector compares against.
    pub snapshots: HashMap<RecKind, TripSnapshot>,
    pub packing: Option<PackingChecklist>,
}

/// Single owner of all ephemeral trip state. Every read and write goes
/// through here; nothing else holds session state. Mutations are atomic
/// single-key operations under one lock, and observers are notified after
/// the lock is released.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionState>>,
    observers: Mutex<Vec<StoreObserver>>,
    in_flight: Mutex<HashSet<(String, RecKind)>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, observer: StoreObserver) {
        self.observers
            .lock()
            .expect("observer registry poisoned")
            .push(observer);
    }

    fn notify(&self, event: StoreEvent<'_>) {
        let observers = self
            .observers
            .lock()
            .expect("observer registry poisoned")
            .clone();
        for observer in observers {
            observer(&event);
        }
    }

    fn lock_sessions(&self) -> std::sync::MutexGuard<'_, HashMap<String, SessionState>> {
        self.sessions.lock().expect("session store poisoned")
    }

    pub fn exists(&self, session: &str) -> bool {
        self.lock_sessions().contains_key(session)
    }

    /// Cloned view of the whole session; empty defaults when the session is
    /// new.
    pub fn state(&self, session: &str) -> SessionState {
        self.lock_sessions().get(session).cloned().unwrap_or_default()
    }

    pub fn trip(&self, session: &str) -> TripContext {
        self.state(session).trip
    }

    pub fn selections(&self, session: &str) -> SelectionSet {
        self.state(session).selections
    }

    pub fn itinerary_generated(&self, session: &str) -> bool {
        self.state(session).itinerary_generated
    }

    /// Applies a partial trip update, creating the session on first write.
    pub fn update_trip(&self, session: &str, update: TripContextUpdate) -> TripContext {
        let trip = {
            let mut sessions = self.lock_sessions();
            let state = sessions.entry(session.to_string()).or_default();
            state.trip.apply(update);
            state.trip.clone()
        };
        self.notify(StoreEvent::Updated {
            session,
            key: StoreKey::Trip,
        });
        trip
    }

    /// Drops the whole session; the traveler returned to the home screen.
    pub fn clear(&self, session: &str) {
        let removed = self.lock_sessions().remove(session).is_some();
        if removed {
            self.notify(StoreEvent::Cleared { session });
        }
    }

    /// Replaces the selection set. A change to the selected places resets
    /// the generated flag so the itinerary is rebuilt for the new picks.
    pub fn set_selections(&self, session: &str, selections: SelectionSet) -> SelectionSet {
        let (result, places_changed, hotel_changed) = {
            let mut sessions = self.lock_sessions();
            let state = sessions.entry(session.to_string()).or_default();
            let places_changed = state.selections.places != selections.places;
            let hotel_changed = state.selections.hotel != selections.hotel;
            if places_changed {
                state.itinerary_generated = false;
            }
            state.selections = selections;
            (state.selections.clone(), places_changed, hotel_changed)
        };
        if places_changed {
            self.notify(StoreEvent::Updated {
                session,
                key: StoreKey::SelectedPlaces,
            });
            self.notify(StoreEvent::Updated {
                session,
                key: StoreKey::ItineraryGenerated,
            });
        }
        if hotel_changed {
            self.notify(StoreEvent::Updated {
                session,
                key: StoreKey::SelectedHotel,
            });
        }
        result
    }

    pub fn recommendation(&self, session: &str, kind: RecKind) -> Option<RecommendationSet> {
        self.lock_sessions()
            .get(session)
            .and_then(|state| state.recommendations.get(&kind).cloned())
    }

    pub fn snapshot(&self, session: &str, kind: RecKind) -> Option<TripSnapshot> {
        self.lock_sessions()
            .get(session)
            .and_then(|state| state.snapshots.get(&kind).cloned())
    }

    /// Stores a freshly fetched set together with the snapshot it was
    /// requested with. Declines when the session has been cleared in the
    /// meantime; the superseded fetch result is simply discarded.
    ///
    /// A successful itinerary store also flips the generated flag, and the
    /// comparison snapshot records the flag as set so the fetch that just
    /// completed is not immediately stale against itself.
    pub fn store_recommendation(&self, session: &str, set: RecommendationSet) -> bool {
        let kind = set.kind;
        let stored = {
            let mut sessions = self.lock_sessions();
            match sessions.get_mut(session) {
                Some(state) => {
                    let mut comparison = set.source_snapshot.clone();
                    if kind == RecKind::Itinerary {
                        state.itinerary_generated = true;
                        comparison.itinerary_generated = true;
                    }
                    state.snapshots.insert(kind, comparison);
                    state.recommendations.insert(kind, set);
                    true
                }
                None => false,
            }
        };
        if stored {
            self.notify(StoreEvent::Updated {
                session,
                key: StoreKey::for_kind(kind),
            });
            if kind == RecKind::Itinerary {
                self.notify(StoreEvent::Updated {
                    session,
                    key: StoreKey::ItineraryGenerated,
                });
            }
        }
        stored
    }

    pub fn packing(&self, session: &str) -> Option<PackingChecklist> {
        self.lock_sessions()
            .get(session)
            .and_then(|state| state.packing.clone())
    }

    pub fn set_packing(&self, session: &str, checklist: PackingChecklist) {
        {
            let mut sessions = self.lock_sessions();
            let state = sessions.entry(session.to_string()).or_default();
            state.packing = Some(checklist);
        }
        self.notify(StoreEvent::Updated {
            session,
            key: StoreKey::PackingCategories,
        });
    }

    pub fn set_packed(&self, session: &str, category: &str, item: &str, packed: bool) -> bool {
        let updated = {
            let mut sessions = self.lock_sessions();
            sessions
                .get_mut(session)
                .and_then(|state| state.packing.as_mut())
                .map(|checklist| checklist.set_packed(category, item, packed))
                .unwrap_or(false)
        };
        if updated {
            self.notify(StoreEvent::Updated {
                session,
                key: StoreKey::PackingItems,
            });
        }
        updated
    }

    /// Marks a (session, kind) fetch as in flight. Returns false when one is
    /// already running; rapid repeated triggers for the same kind are
    /// rejected while different kinds overlap freely.
    pub fn begin_fetch(&self, session: &str, kind: RecKind) -> bool {
        self.in_flight
            .lock()
            .expect("in-flight registry poisoned")
            .insert((session.to_string(), kind))
    }

    pub fn finish_fetch(&self, session: &str, kind: RecKind) {
        self.in_flight
            .lock()
            .expect("in-flight registry poisoned")
            .remove(&(session.to_string(), kind));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::recommendation::{Place, RecommendationItems, RecommendationSet};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample_set(store: &SessionStore, session: &str) -> RecommendationSet {
        let state = store.state(session);
        let snapshot = TripSnapshot::capture(&state.trip, &state.selections, state.itinerary_generated);
        RecommendationSet::new(
            RecommendationItems::Places(vec![Place {
                name: "Baga Beach".to_string(),
                ..Default::default()
            }]),
            snapshot,
        )
    }

    #[test]
    fn update_creates_session_and_clear_removes_it() {
        let store = SessionStore::new();
        store.update_trip(
            "s1",
            TripContextUpdate {
                destination: Some("Goa".to_string()),
                ..Default::default()
            },
        );
        assert!(store.exists("s1"));
        assert_eq!(store.trip("s1").destination.as_deref(), Some("Goa"));

        store.clear("s1");
        assert!(!store.exists("s1"));
        assert_eq!(store.trip("s1"), TripContext::default());
    }

    #[test]
    fn store_declines_writes_to_cleared_session() {
        let store = SessionStore::new();
        store.update_trip("s1", TripContextUpdate::default());
        let set = sample_set(&store, "s1");
        store.clear("s1");
        assert!(!store.store_recommendation("s1", set));
        assert!(store.recommendation("s1", RecKind::Places).is_none());
    }

    #[test]
    fn observers_fire_synchronously_on_mutation() {
        let store = SessionStore::new();
        let updates = Arc::new(AtomicUsize::new(0));
        let seen = updates.clone();
        let observer: StoreObserver = Arc::new(move |event: &StoreEvent<'_>| {
            if let StoreEvent::Updated { key: StoreKey::Trip, .. } = event {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        });
        store.subscribe(observer);
        store.update_trip("s1", TripContextUpdate::default());
        assert_eq!(updates.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn changing_places_resets_generated_flag() {
        let store = SessionStore::new();
        store.update_trip("s1", TripContextUpdate::default());
        store.set_selections(
            "s1",
            SelectionSet {
                places: vec!["a".to_string()],
                hotel: None,
            },
        );
        let set = RecommendationSet::new(
            RecommendationItems::Itinerary(Vec::new()),
            TripSnapshot::capture(&store.trip("s1"), &store.selections("s1"), false),
        );
        assert!(store.store_recommendation("s1", set));
        assert!(store.itinerary_generated("s1"));
        // Comparison snapshot records the post-generation flag.
        assert!(store.snapshot("s1", RecKind::Itinerary).unwrap().itinerary_generated);

        // Hotel-only change keeps the flag.
        store.set_selections(
            "s1",
            SelectionSet {
                places: vec!["a".to_string()],
                hotel: Some("h".to_string()),
            },
        );
        assert!(store.itinerary_generated("s1"));

        // Place change resets it.
        store.set_selections(
            "s1",
            SelectionSet {
                places: vec!["b".to_string()],
                hotel: Some("h".to_string()),
            },
        );
        assert!(!store.itinerary_generated("s1"));
    }

    #[test]
    fn in_flight_flag_gates_same_kind_only() {
        let store = SessionStore::new();
        assert!(store.begin_fetch("s1", RecKind::Places));
        assert!(!store.begin_fetch("s1", RecKind::Places));
        // Different kind and different session are independent.
        assert!(store.begin_fetch("s1", RecKind::Hotels));
        assert!(store.begin_fetch("s2", RecKind::Places));

        store.finish_fetch("s1", RecKind::Places);
        assert!(store.begin_fetch("s1", RecKind::Places));
    }
}
