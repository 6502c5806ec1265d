use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TravelMethod {
    Metro,
    Car,
    Bus,
    Cab,
    BestRoute,
    Flight,
    Train,
    Bike,
}

impl TravelMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Metro => "metro",
            Self::Car => "car",
            Self::Bus => "bus",
            Self::Cab => "cab",
            Self::BestRoute => "best-route",
            Self::Flight => "flight",
            Self::Train => "train",
            Self::Bike => "bike",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetTier {
    Low,
    Medium,
    High,
}

impl BudgetTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Companions {
    Solo,
    Couple,
    Family,
    Friends,
    Group,
    Business,
}

impl Companions {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solo => "solo",
            Self::Couple => "couple",
            Self::Family => "family",
            Self::Friends => "friends",
            Self::Group => "group",
            Self::Business => "business",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MealPreference {
    Veg,
    NonVeg,
    Jain,
    Indian,
    Chinese,
    Mixed,
    Vegan,
}

impl MealPreference {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Veg => "veg",
            Self::NonVeg => "non-veg",
            Self::Jain => "jain",
            Self::Indian => "indian",
            Self::Chinese => "chinese",
            Self::Mixed => "mixed",
            Self::Vegan => "vegan",
        }
    }
}

/// The traveler's accumulated questionnaire answers. Created empty when the
/// wizard starts, mutated field-by-field, cleared when the traveler returns
/// to the home screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripContext {
    pub destination: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub number_of_days: Option<u32>,
    pub travel_method: Option<TravelMethod>,
    pub budget: Option<BudgetTier>,
    pub companions: Option<Companions>,
    #[serde(default)]
    pub meal_preferences: Vec<MealPreference>,
    #[serde(default)]
    pub selected_categories: Vec<String>,
    #[serde(default)]
    pub selected_preferences: Vec<String>,
    pub places_per_day: Option<u32>,
}

/// Partial update applied by PATCH /api/trip. Absent fields are untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripContextUpdate {
    pub destination: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub number_of_days: Option<u32>,
    pub travel_method: Option<TravelMethod>,
    pub budget: Option<BudgetTier>,
    pub companions: Option<Companions>,
    pub meal_preferences: Option<Vec<MealPreference>>,
    pub selected_categories: Option<Vec<String>>,
    pub selected_preferences: Option<Vec<String>>,
    pub places_per_day: Option<u32>,
}

impl TripContext {
    /// Applies a partial update. `end_date` is derived:
    /// `end_date = start_date + number_of_days - 1`, recomputed whenever
    /// start date or day count changes. Setting `end_date` directly
    /// recomputes the day count instead, so the later input always wins and
    /// the derived field is the one overwritten.
    pub fn apply(&mut self, update: TripContextUpdate) {
        if let Some(destination) = update.destination {
            self.destination = Some(destination);
        }
        if let Some(method) = update.travel_method {
            self.travel_method = Some(method);
        }
        if let Some(budget) = update.budget {
            self.budget = Some(budget);
        }
        if let Some(companions) = update.companions {
            self.companions = Some(companions);
        }
        if let Some(meals) = update.meal_preferences {
            self.meal_preferences = meals;
        }
        if let Some(categories) = update.selected_categories {
            self.selected_categories = categories;
        }
        if let Some(preferences) = update.selected_preferences {
            self.selected_preferences = preferences;
        }
        if let Some(per_day) = update.places_per_day {
            self.places_per_day = Some(per_day.max(1));
        }

        if let Some(days) = update.number_of_days {
            self.number_of_days = Some(days.max(1));
            self.recompute_end_date();
        }
        if let Some(start) = update.start_date {
            self.start_date = Some(start);
            self.recompute_end_date();
        }
        if let Some(end) = update.end_date {
            self.end_date = Some(end);
            self.recompute_number_of_days();
        }
    }

    fn recompute_end_date(&mut self) {
        if let (Some(start), Some(days)) = (self.start_date, self.number_of_days) {
            self.end_date = Some(start + Duration::days(days as i64 - 1));
        }
    }

    fn recompute_number_of_days(&mut self) {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            let days = (end - start).num_days() + 1;
            if days >= 1 {
                self.number_of_days = Some(days as u32);
            }
        }
    }

    /// Meal preferences as used for prompts and snapshots: defaults to
    /// `mixed` when the traveler supplied none.
    pub fn effective_meal_preferences(&self) -> Vec<MealPreference> {
        if self.meal_preferences.is_empty() {
            vec![MealPreference::Mixed]
        } else {
            self.meal_preferences.clone()
        }
    }
}

/// The traveler's chosen subset: place names and at most one hotel name.
/// Items are referenced by name, not by the recommendation set that produced
/// them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionSet {
    #[serde(default)]
    pub places: Vec<String>,
    pub hotel: Option<String>,
}

impl SelectionSet {
    pub const MIN_PLACES_FOR_ITINERARY: usize = 4;

    /// Progression gate for itinerary generation: exactly one hotel and at
    /// least four places.
    pub fn can_proceed_to_itinerary(&self) -> bool {
        self.hotel.is_some() && self.places.len() >= Self::MIN_PLACES_FOR_ITINERARY
    }
}

/// Frozen copy of every staleness-relevant field, taken at the moment a
/// recommendation fetch is triggered. Immutable once stored next to the
/// fetched set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripSnapshot {
    pub destination: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub number_of_days: Option<u32>,
    pub travel_method: Option<TravelMethod>,
    pub budget: Option<BudgetTier>,
    pub companions: Option<Companions>,
    pub meal_preferences: Vec<MealPreference>,
    pub selected_categories: Vec<String>,
    pub selected_preferences: Vec<String>,
    pub selected_places: Vec<String>,
    pub itinerary_generated: bool,
}

impl TripSnapshot {
    pub fn capture(trip: &TripContext, selections: &SelectionSet, itinerary_generated: bool) -> Self {
        Self {
            destination: trip.destination.clone(),
            start_date: trip.start_date,
            number_of_days: trip.number_of_days,
            travel_method: trip.travel_method,
            budget: trip.budget,
            companions: trip.companions,
            meal_preferences: trip.effective_meal_preferences(),
            selected_categories: trip.selected_categories.clone(),
            selected_preferences: trip.selected_preferences.clone(),
            selected_places: selections.places.clone(),
            itinerary_generated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn end_date_derived_from_start_and_days() {
        let mut trip = TripContext::default();
        trip.apply(TripContextUpdate {
            destination: Some("Goa".to_string()),
            number_of_days: Some(3),
            start_date: Some(date("2024-06-01")),
            ..Default::default()
        });
        assert_eq!(trip.end_date, Some(date("2024-06-03")));
    }

    #[test]
    fn changing_days_overwrites_end_date() {
        let mut trip = TripContext::default();
        trip.apply(TripContextUpdate {
            start_date: Some(date("2024-06-01")),
            number_of_days: Some(3),
            ..Default::default()
        });
        trip.apply(TripContextUpdate {
            number_of_days: Some(5),
            ..Default::default()
        });
        assert_eq!(trip.end_date, Some(date("2024-06-05")));
    }

    #[test]
    fn setting_end_date_recomputes_days() {
        let mut trip = TripContext::default();
        trip.apply(TripContextUpdate {
            start_date: Some(date("2024-06-01")),
            number_of_days: Some(3),
            ..Default::default()
        });
        trip.apply(TripContextUpdate {
            end_date: Some(date("2024-06-07")),
            ..Default::default()
        });
        assert_eq!(trip.number_of_days, Some(7));
        assert_eq!(trip.end_date, Some(date("2024-06-07")));
    }

    #[test]
    fn number_of_days_is_at_least_one() {
        let mut trip = TripContext::default();
        trip.apply(TripContextUpdate {
            number_of_days: Some(0),
            ..Default::default()
        });
        assert_eq!(trip.number_of_days, Some(1));
    }

    #[test]
    fn meal_preferences_default_to_mixed() {
        let trip = TripContext::default();
        assert_eq!(trip.effective_meal_preferences(), vec![MealPreference::Mixed]);

        let mut trip = TripContext::default();
        trip.apply(TripContextUpdate {
            meal_preferences: Some(vec![MealPreference::Veg, MealPreference::Jain]),
            ..Default::default()
        });
        assert_eq!(
            trip.effective_meal_preferences(),
            vec![MealPreference::Veg, MealPreference::Jain]
        );
    }

    #[test]
    fn itinerary_progression_guard() {
        let selections = SelectionSet {
            places: vec!["a".into(), "b".into(), "c".into(), "d".into(), "e".into()],
            hotel: None,
        };
        assert!(!selections.can_proceed_to_itinerary());

        let selections = SelectionSet {
            places: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            hotel: Some("Hotel Sunrise".into()),
        };
        assert!(selections.can_proceed_to_itinerary());

        let selections = SelectionSet {
            places: vec!["a".into(), "b".into(), "c".into()],
            hotel: Some("Hotel Sunrise".into()),
        };
        assert!(!selections.can_proceed_to_itinerary());
    }

    #[test]
    fn travel_method_serializes_kebab_case() {
        let json = serde_json::to_string(&TravelMethod::BestRoute).unwrap();
        assert_eq!(json, "\"best-route\"");
        let meal: MealPreference = serde_json::from_str("\"non-veg\"").unwrap();
        assert_eq!(meal, MealPreference::NonVeg);
    }
}
