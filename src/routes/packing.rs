use actix_web::{web, HttpRequest, HttpResponse, Responder};
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::middleware::auth::Claims;
use crate::models::packing::StoredPackingList;
use crate::routes::session_id;
use crate::services::session_store::SessionStore;

const PACKING_COLLECTION: &str = "PackingLists";

#[derive(Debug, Deserialize)]
pub struct PackingQuery {
    pub destination: String,
    pub start_date: String,
}

/*
    /api/packing-lists?destination=&start_date=
*/
pub async fn get_packing_list(
    claims: web::ReqData<Claims>,
    data: web::Data<Arc<Client>>,
    query: web::Query<PackingQuery>,
) -> impl Responder {
    let user_id = match ObjectId::parse_str(&claims.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    let client = data.into_inner();
    let collection: mongodb::Collection<StoredPackingList> =
        client.database("Travelers").collection(PACKING_COLLECTION);

    let filter = doc! {
        "user_id": user_id,
        "destination": &query.destination,
        "start_date": &query.start_date,
    };

    match collection.find_one(filter).await {
        Ok(Some(list)) => HttpResponse::Ok().json(list),
        Ok(None) => HttpResponse::NotFound().body("No packing list for this trip"),
        Err(err) => {
            log::error!("Failed to fetch packing list: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch packing list")
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ToggleItemRequest {
    pub destination: String,
    pub start_date: String,
    pub category: String,
    pub item: String,
    pub packed: bool,
}

/*
    PUT /api/packing-lists/items: flip one item's packed state. The durable
    copy is updated, and the session mirror too when the wizard session is
    still around.
*/
pub async fn toggle_item(
    req: HttpRequest,
    claims: web::ReqData<Claims>,
    data: web::Data<Arc<Client>>,
    store: web::Data<Arc<SessionStore>>,
    input: web::Json<ToggleItemRequest>,
) -> impl Responder {
    let user_id = match ObjectId::parse_str(&claims.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    let client = data.into_inner();
    let collection: mongodb::Collection<StoredPackingList> =
        client.database("Travelers").collection(PACKING_COLLECTION);

    let body = input.into_inner();
    let filter = doc! {
        "user_id": user_id,
        "destination": &body.destination,
        "start_date": &body.start_date,
    };

    let mut list = match collection.find_one(filter.clone()).await {
        Ok(Some(list)) => list,
        Ok(None) => return HttpResponse::NotFound().body("No packing list for this trip"),
        Err(err) => {
            log::error!("Failed to fetch packing list: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to update packing list");
        }
    };

    if !list.checklist.set_packed(&body.category, &body.item, body.packed) {
        return HttpResponse::NotFound().body("No such packing item");
    }

    let checklist_bson = match mongodb::bson::to_bson(&list.checklist) {
        Ok(bson) => bson,
        Err(err) => {
            log::error!("Failed to serialize packing checklist: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to update packing list");
        }
    };

    let update = doc! {
        "$set": {
            "checklist": checklist_bson,
            "updated_at": mongodb::bson::DateTime::now(),
        }
    };

    match collection.update_one(filter, update).await {
        Ok(_) => {
            if let Some(session) = session_id(&req) {
                store.set_packed(&session, &body.category, &body.item, body.packed);
            }
            HttpResponse::Ok().json(json!({
                "category": body.category,
                "item": body.item,
                "packed": body.packed,
            }))
        }
        Err(err) => {
            log::error!("Failed to update packing list: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to update packing list")
        }
    }
}
