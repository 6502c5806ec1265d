use crate::models::recommendation::RecKind;
use crate::models::trip::TripContext;

/// System message sent ahead of every generated prompt.
pub const SYSTEM_PROMPT: &str = "You are a travel planning assistant for a trip-planning app. \
You reply with machine-readable JSON exactly as instructed and never add commentary, greetings or markdown.";

/// Fallback batch size when the wizard has not produced a day count yet.
const DEFAULT_PLACE_COUNT: u32 = 10;
const HOTEL_COUNT: u32 = 6;

/// Call-site inputs that are not trip fields.
#[derive(Debug, Clone, Default)]
pub struct PromptExtras {
    /// Places the traveler picked; drives the itinerary prompt.
    pub selected_places: Vec<String>,
    /// The one chosen hotel; drives the itinerary prompt.
    pub chosen_hotel: Option<String>,
    /// Names already shown, excluded from a "show more" batch.
    pub exclude_names: Vec<String>,
}

/// Deterministically renders the trip context into the instruction string
/// for one recommendation kind. Pure function, no I/O.
///
/// The closing respond-with-only-JSON instruction and its field list are the
/// only defense the extractor has against prose-wrapped replies; the exact
/// field names are part of the wire contract, not decoration.
pub fn build_prompt(kind: RecKind, trip: &TripContext, extras: &PromptExtras) -> String {
    match kind {
        RecKind::Places => places_prompt(trip, extras),
        RecKind::Hotels => hotels_prompt(trip, extras),
        RecKind::Itinerary => itinerary_prompt(trip, extras),
        RecKind::Packing => packing_prompt(trip),
    }
}

fn trip_sentences(trip: &TripContext) -> Vec<String> {
    let mut sentences = Vec::new();
    if let Some(destination) = &trip.destination {
        sentences.push(format!("I am planning a trip to {}.", destination));
    }
    if let (Some(start), Some(days)) = (trip.start_date, trip.number_of_days) {
        sentences.push(format!(
            "The trip starts on {} and lasts {} days.",
            start.format("%Y-%m-%d"),
            days
        ));
    }
    if let Some(method) = trip.travel_method {
        sentences.push(format!("I will be getting around by {}.", method.as_str()));
    }
    if let Some(budget) = trip.budget {
        sentences.push(format!("My budget level is {}.", budget.as_str()));
    }
    if let Some(companions) = trip.companions {
        sentences.push(format!("I am traveling {}.", companions.as_str()));
    }
    let meals: Vec<&str> = trip
        .effective_meal_preferences()
        .iter()
        .map(|m| m.as_str())
        .collect();
    sentences.push(format!("My food preferences are: {}.", meals.join(", ")));
    sentences
}

fn exclude_sentence(exclude_names: &[String]) -> Option<String> {
    if exclude_names.is_empty() {
        None
    } else {
        Some(format!(
            "Do not repeat any of these, I have already seen them: {}.",
            exclude_names.join(", ")
        ))
    }
}

fn places_prompt(trip: &TripContext, extras: &PromptExtras) -> String {
    let mut sentences = trip_sentences(trip);
    if !trip.selected_categories.is_empty() {
        sentences.push(format!(
            "I am interested in these categories: {}.",
            trip.selected_categories.join(", ")
        ));
    }
    if !trip.selected_preferences.is_empty() {
        sentences.push(format!(
            "Within those, I prefer: {}.",
            trip.selected_preferences.join(", ")
        ));
    }

    let count = match (trip.places_per_day, trip.number_of_days) {
        (Some(per_day), Some(days)) => per_day * days,
        _ => DEFAULT_PLACE_COUNT,
    };
    sentences.push(format!(
        "Suggest {} tourist places to visit that match this trip.",
        count
    ));
    if let Some(sentence) = exclude_sentence(&extras.exclude_names) {
        sentences.push(sentence);
    }

    format!(
        "{}\n\nRespond with ONLY a valid JSON array and nothing else. No markdown fences, no explanatory text. \
Each element must be an object with exactly these fields: \
\"name\", \"description\", \"timing\", \"ticket\", \"who_can_visit\", \"image_url\". \
All field values must be strings.",
        sentences.join(" ")
    )
}

fn hotels_prompt(trip: &TripContext, extras: &PromptExtras) -> String {
    let mut sentences = trip_sentences(trip);
    sentences.push(format!(
        "Suggest {} hotels to stay at that match this trip.",
        HOTEL_COUNT
    ));
    if let Some(sentence) = exclude_sentence(&extras.exclude_names) {
        sentences.push(sentence);
    }

    format!(
        "{}\n\nRespond with ONLY a valid JSON array and nothing else. No markdown fences, no explanatory text. \
Each element must be an object with exactly these fields: \
\"name\", \"room_type\", \"price_per_person\", \"food\", \"companion_type\", \"budget\", \"image_url\". \
All field values must be strings.",
        sentences.join(" ")
    )
}

fn itinerary_prompt(trip: &TripContext, extras: &PromptExtras) -> String {
    let mut sentences = trip_sentences(trip);
    if !extras.selected_places.is_empty() {
        sentences.push(format!(
            "I have chosen to visit these places: {}.",
            extras.selected_places.join(", ")
        ));
    }
    if let Some(hotel) = &extras.chosen_hotel {
        sentences.push(format!("I am staying at {}.", hotel));
    }
    if let Some(per_day) = trip.places_per_day {
        sentences.push(format!("Plan around {} places per day.", per_day));
    }
    let days = trip.number_of_days.unwrap_or(1);
    sentences.push(format!(
        "Create a day-by-day itinerary covering all {} days of the trip using the chosen places.",
        days
    ));

    format!(
        "{}\n\nRespond with ONLY a valid JSON array and nothing else. No markdown fences, no explanatory text. \
Each element is one day: an object with fields \
\"day\" (number), \"title\", \"hotel\", \"image\", \"description\" and \"activities\". \
\"activities\" is an array of objects with fields \
\"time\", \"activity\", \"duration\", \"description\", \"image\", \"mapUrl\", \
\"transportOptions\" (array of strings), \"foodSuggestions\" (array of strings), \
\"souvenirSuggestions\" (array of strings).",
        sentences.join(" ")
    )
}

fn packing_prompt(trip: &TripContext) -> String {
    let mut sentences = trip_sentences(trip);
    sentences.push(
        "Create a packing list for this trip, grouped into sensible categories.".to_string(),
    );

    format!(
        "{}\n\nRespond with ONLY a valid JSON object and nothing else. No markdown fences, no explanatory text. \
The object must have a \"categories\" field: an array of objects with fields \
\"name\" and \"items\" (array of strings). It may also have an optional \"tips\" string field.",
        sentences.join(" ")
    )
}
