use actix_web::{web, HttpRequest, HttpResponse, Responder};
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::middleware::auth;
use crate::models::recommendation::RecKind;
use crate::routes::require_session;
use crate::services::orchestrator::{FetchError, Orchestrator};
use crate::services::session_store::SessionStore;
use crate::services::step_validation;

#[derive(Debug, Deserialize)]
pub struct FetchQuery {
    /// Show More: request an additional batch appended after the items the
    /// traveler has already seen.
    #[serde(default)]
    pub more: bool,
}

/*
    POST /api/recommendations/{kind}
*/
pub async fn fetch(
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<FetchQuery>,
    store: web::Data<Arc<SessionStore>>,
    orchestrator: web::Data<Orchestrator>,
) -> impl Responder {
    let session = match require_session(&req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    let kind: RecKind = match path.into_inner().parse() {
        Ok(kind) => kind,
        Err(()) => return HttpResponse::BadRequest().body("Unknown recommendation kind"),
    };

    // Reject before any model call when the wizard has not produced the
    // fields this kind needs.
    let trip = store.trip(&session);
    if let Err(err) = step_validation::validate_for_fetch(kind, &trip) {
        return HttpResponse::BadRequest().json(json!({
            "error": "Missing required fields",
            "missing": err.missing,
        }));
    }

    if kind == RecKind::Itinerary {
        let selections = store.selections(&session);
        if !selections.can_proceed_to_itinerary() {
            return HttpResponse::BadRequest().json(json!({
                "error": "Itinerary generation needs exactly one hotel and at least four places selected",
                "selected_places": selections.places.len(),
                "hotel_selected": selections.hotel.is_some(),
            }));
        }
    }

    // Signed-in travelers get the durable packing-list cache; everyone else
    // still gets the session one.
    let user_id = auth::optional_claims(&req)
        .and_then(|claims| ObjectId::parse_str(&claims.user_id).ok());

    match orchestrator.fetch(kind, &session, user_id, query.more).await {
        Ok(outcome) => HttpResponse::Ok().json(json!({
            "kind": kind,
            "from_cache": outcome.from_cache,
            "items": outcome.set.items.payload_json(),
            "fetched_at": outcome.set.fetched_at,
        })),
        Err(err) => {
            let message = err.user_message(kind);
            match &err {
                FetchError::InFlight => HttpResponse::Conflict().json(json!({ "error": message })),
                FetchError::Gateway(gateway_err) => {
                    log::error!("{} fetch failed at the gateway: {}", kind, gateway_err);
                    HttpResponse::BadGateway().json(json!({ "error": message }))
                }
                FetchError::Extraction(extraction_err) => {
                    // The raw model text goes to the log only, never to the
                    // client.
                    log::error!("{} fetch returned unusable text: {}", kind, extraction_err);
                    HttpResponse::BadGateway().json(json!({ "error": message }))
                }
            }
        }
    }
}
