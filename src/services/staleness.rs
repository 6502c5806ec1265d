use crate::models::recommendation::RecKind;
use crate::models::trip::TripSnapshot;

/// Decides reuse vs. regenerate for one recommendation kind by comparing
/// the current snapshot against the one stored with the last successful
/// fetch. Purely field-level equality; elapsed time never matters.
pub fn should_refresh(kind: RecKind, current: &TripSnapshot, last: Option<&TripSnapshot>) -> bool {
    // First-ever fetch always counts as changed.
    let last = match last {
        Some(last) => last,
        None => return true,
    };

    match kind {
        // Hotel selection alone never forces a places refresh; hotels are
        // tracked independently.
        RecKind::Places => {
            trip_fields_differ(current, last)
                || current.selected_categories != last.selected_categories
                || current.selected_preferences != last.selected_preferences
        }
        // Hotels are not category-driven, so only the trip fields count.
        RecKind::Hotels => trip_fields_differ(current, last),
        // Order-sensitive by design: the lists are compared through their
        // serialized string forms, so a pure reorder or a duplicate change
        // regenerates the itinerary. Flagged to product as possibly an
        // artifact of the original equality check; reproduced, not fixed.
        RecKind::Itinerary => {
            current.itinerary_generated != last.itinerary_generated
                || serialized(&current.selected_places) != serialized(&last.selected_places)
        }
        // Keyed by (identity, destination, start_date) only. Changing the
        // budget, companions or travel method while those are unchanged
        // silently reuses the old list. Flagged; reproduced, not fixed.
        RecKind::Packing => {
            current.destination != last.destination || current.start_date != last.start_date
        }
    }
}

fn trip_fields_differ(current: &TripSnapshot, last: &TripSnapshot) -> bool {
    current.destination != last.destination
        || current.companions != last.companions
        || current.travel_method != last.travel_method
        || current.budget != last.budget
        || current.number_of_days != last.number_of_days
        || current.start_date != last.start_date
        || current.meal_preferences != last.meal_preferences
}

fn serialized(places: &[String]) -> String {
    serde_json::to_string(places).unwrap_or_default()
}
