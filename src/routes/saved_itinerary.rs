use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Client;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::middleware::auth::Claims;
use crate::models::saved_itinerary::{SaveItineraryRequest, SavedItinerary};

const SAVED_COLLECTION: &str = "SavedItineraries";

/*
    POST /api/itineraries/save
*/
pub async fn save(
    claims: web::ReqData<Claims>,
    data: web::Data<Arc<Client>>,
    input: web::Json<SaveItineraryRequest>,
) -> impl Responder {
    let user_id = match ObjectId::parse_str(&claims.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    let client = data.into_inner();
    let collection: mongodb::Collection<SavedItinerary> =
        client.database("Travelers").collection(SAVED_COLLECTION);

    let body = input.into_inner();
    let saved = SavedItinerary {
        id: None,
        saved_id: Uuid::new_v4().to_string(),
        user_id,
        destination: body.destination,
        date: body.date,
        places: body.places,
        hotel: body.hotel,
        itinerary: body.itinerary,
        timestamp: Utc::now(),
    };

    match collection.insert_one(&saved).await {
        Ok(_) => HttpResponse::Ok().json(json!({ "saved_id": saved.saved_id })),
        Err(err) => {
            log::error!("Failed to save itinerary: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to save itinerary")
        }
    }
}

/*
    /api/itineraries/saved
*/
pub async fn list(claims: web::ReqData<Claims>, data: web::Data<Arc<Client>>) -> impl Responder {
    let user_id = match ObjectId::parse_str(&claims.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    let client = data.into_inner();
    let collection: mongodb::Collection<SavedItinerary> =
        client.database("Travelers").collection(SAVED_COLLECTION);

    let cursor = collection
        .find(doc! { "user_id": user_id })
        .sort(doc! { "timestamp": -1 })
        .await;

    match cursor {
        Ok(cursor) => match cursor.try_collect::<Vec<SavedItinerary>>().await {
            Ok(itineraries) => HttpResponse::Ok().json(itineraries),
            Err(err) => {
                log::error!("Failed to collect saved itineraries: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to fetch saved itineraries")
            }
        },
        Err(err) => {
            log::error!("Failed to fetch saved itineraries: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch saved itineraries")
        }
    }
}

/*
    /api/itineraries/saved/{id}
*/
pub async fn get_by_id(
    claims: web::ReqData<Claims>,
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> impl Responder {
    let user_id = match ObjectId::parse_str(&claims.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    let client = data.into_inner();
    let collection: mongodb::Collection<SavedItinerary> =
        client.database("Travelers").collection(SAVED_COLLECTION);

    let filter = doc! {
        "user_id": user_id,
        "saved_id": path.into_inner(),
    };

    match collection.find_one(filter).await {
        Ok(Some(itinerary)) => HttpResponse::Ok().json(itinerary),
        Ok(None) => HttpResponse::NotFound().body("Saved itinerary not found"),
        Err(err) => {
            log::error!("Failed to fetch saved itinerary: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch saved itinerary")
        }
    }
}
