use std::error::Error;
use std::fmt;

use crate::models::trip::TripContext;

/// TripContext fields a wizard step can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripField {
    Destination,
    StartDate,
    NumberOfDays,
    TravelMethod,
    Budget,
    Companions,
    SelectedCategories,
    PlacesPerDay,
}

impl TripField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Destination => "destination",
            Self::StartDate => "start_date",
            Self::NumberOfDays => "number_of_days",
            Self::TravelMethod => "travel_method",
            Self::Budget => "budget",
            Self::Companions => "companions",
            Self::SelectedCategories => "selected_categories",
            Self::PlacesPerDay => "places_per_day",
        }
    }

    fn is_present(self, trip: &TripContext) -> bool {
        match self {
            Self::Destination => trip.destination.as_deref().is_some_and(|d| !d.is_empty()),
            Self::StartDate => trip.start_date.is_some(),
            Self::NumberOfDays => trip.number_of_days.is_some(),
            Self::TravelMethod => trip.travel_method.is_some(),
            Self::Budget => trip.budget.is_some(),
            Self::Companions => trip.companions.is_some(),
            Self::SelectedCategories => !trip.selected_categories.is_empty(),
            Self::PlacesPerDay => trip.places_per_day.is_some(),
        }
    }
}

/// The wizard's step table: step number → the fields that must be present
/// before the traveler may move past it. Requirements are cumulative, so
/// skipping ahead with an incomplete earlier step still fails. Meal
/// preferences are absent on purpose: an empty set defaults to `mixed` at
/// submission and never blocks navigation.
const STEPS: &[(&str, &[TripField])] = &[
    ("destination", &[TripField::Destination]),
    (
        "dates",
        &[
            TripField::Destination,
            TripField::StartDate,
            TripField::NumberOfDays,
        ],
    ),
    (
        "travel",
        &[
            TripField::Destination,
            TripField::StartDate,
            TripField::NumberOfDays,
            TripField::TravelMethod,
        ],
    ),
    (
        "budget-and-company",
        &[
            TripField::Destination,
            TripField::StartDate,
            TripField::NumberOfDays,
            TripField::TravelMethod,
            TripField::Budget,
            TripField::Companions,
        ],
    ),
    (
        "categories",
        &[
            TripField::Destination,
            TripField::StartDate,
            TripField::NumberOfDays,
            TripField::TravelMethod,
            TripField::Budget,
            TripField::Companions,
            TripField::SelectedCategories,
            TripField::PlacesPerDay,
        ],
    ),
];

pub fn step_count() -> usize {
    STEPS.len()
}

/// Required TripContext fields missing before a step transition. Inline,
/// blocks navigation, enumerates the missing field names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub step: usize,
    pub step_name: &'static str,
    pub missing: Vec<&'static str>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step {} ({}) is missing required fields: {}",
            self.step,
            self.step_name,
            self.missing.join(", ")
        )
    }
}

impl Error for ValidationError {}

/// Checks whether the trip context satisfies the given 1-based wizard step.
/// Unknown step numbers validate against the full table.
pub fn validate_step(step: usize, trip: &TripContext) -> Result<(), ValidationError> {
    let index = step.saturating_sub(1).min(STEPS.len() - 1);
    let (step_name, required) = STEPS[index];

    let missing: Vec<&'static str> = required
        .iter()
        .filter(|field| !field.is_present(trip))
        .map(|field| field.as_str())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError {
            step: index + 1,
            step_name,
            missing,
        })
    }
}

/// Fields a recommendation fetch needs, checked before the orchestrator is
/// invoked so a half-filled wizard cannot trigger a model call.
pub fn required_fields_for_fetch(kind: crate::models::recommendation::RecKind) -> &'static [TripField] {
    use crate::models::recommendation::RecKind;
    match kind {
        RecKind::Places => STEPS[STEPS.len() - 1].1,
        RecKind::Hotels => STEPS[3].1,
        RecKind::Itinerary => STEPS[3].1,
        RecKind::Packing => &[TripField::Destination, TripField::StartDate],
    }
}

pub fn validate_for_fetch(
    kind: crate::models::recommendation::RecKind,
    trip: &TripContext,
) -> Result<(), ValidationError> {
    let required = required_fields_for_fetch(kind);
    let missing: Vec<&'static str> = required
        .iter()
        .filter(|field| !field.is_present(trip))
        .map(|field| field.as_str())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError {
            step: 0,
            step_name: "fetch",
            missing,
        })
    }
}
