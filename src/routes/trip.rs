use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde_json::json;
use std::sync::Arc;

use crate::models::trip::{SelectionSet, TripContextUpdate};
use crate::routes::require_session;
use crate::services::session_store::SessionStore;
use crate::services::step_validation;

/*
    /api/trip
*/
pub async fn get_trip(req: HttpRequest, store: web::Data<Arc<SessionStore>>) -> impl Responder {
    let session = match require_session(&req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    let state = store.state(&session);
    HttpResponse::Ok().json(json!({
        "trip": state.trip,
        "selections": state.selections,
        "itinerary_generated": state.itinerary_generated,
        "can_proceed_to_itinerary": state.selections.can_proceed_to_itinerary(),
    }))
}

pub async fn update_trip(
    req: HttpRequest,
    store: web::Data<Arc<SessionStore>>,
    input: web::Json<TripContextUpdate>,
) -> impl Responder {
    let session = match require_session(&req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    let trip = store.update_trip(&session, input.into_inner());
    HttpResponse::Ok().json(trip)
}

/*
    DELETE /api/trip: the traveler went back to the home screen; every
    answer, selection and cached recommendation for the session goes away.
*/
pub async fn clear_trip(req: HttpRequest, store: web::Data<Arc<SessionStore>>) -> impl Responder {
    let session = match require_session(&req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    store.clear(&session);
    HttpResponse::Ok().body("Trip cleared")
}

/*
    /api/trip/steps/{step}
*/
pub async fn validate_step(
    req: HttpRequest,
    store: web::Data<Arc<SessionStore>>,
    path: web::Path<usize>,
) -> impl Responder {
    let session = match require_session(&req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    let step = path.into_inner();
    let trip = store.trip(&session);
    match step_validation::validate_step(step, &trip) {
        Ok(()) => HttpResponse::Ok().json(json!({ "step": step, "valid": true })),
        Err(err) => HttpResponse::BadRequest().json(json!({
            "error": "Missing required fields",
            "step": err.step,
            "step_name": err.step_name,
            "missing": err.missing,
        })),
    }
}

/*
    PUT /api/trip/selections
*/
pub async fn set_selections(
    req: HttpRequest,
    store: web::Data<Arc<SessionStore>>,
    input: web::Json<SelectionSet>,
) -> impl Responder {
    let session = match require_session(&req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    let selections = store.set_selections(&session, input.into_inner());
    let can_proceed = selections.can_proceed_to_itinerary();
    HttpResponse::Ok().json(json!({
        "selections": selections,
        "can_proceed_to_itinerary": can_proceed,
    }))
}
