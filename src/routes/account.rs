use actix_web::{web, HttpResponse, Responder};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use mongodb::bson::doc;
use mongodb::bson::oid::ObjectId;
use mongodb::error::WriteError;
use mongodb::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::middleware::auth::Claims;
use crate::models::account::{User, UserSession};

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    auth_token: String,
}

pub async fn signup(data: web::Data<Arc<Client>>, input: web::Json<User>) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<User> = client.database("Account").collection("Users");

    if !is_valid_email(&input.email) {
        return HttpResponse::BadRequest().body("Invalid email address");
    }
    if input.password.is_empty() {
        return HttpResponse::BadRequest().body("Password must not be empty");
    }

    let curr_time = Utc::now();
    let mut doc = input.into_inner();

    doc.password = match bcrypt::hash(&doc.password, bcrypt::DEFAULT_COST) {
        Ok(hashed) => hashed,
        Err(err) => {
            log::error!("Failed to hash password: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to create user");
        }
    };
    doc.created_at = Some(curr_time);
    doc.updated_at = Some(curr_time);

    match collection.insert_one(&doc).await {
        Ok(result) => match result.inserted_id.as_object_id() {
            Some(user_id) => match generate_token(&doc.email, user_id) {
                Ok(token) => HttpResponse::Ok().json(TokenResponse { auth_token: token }),
                Err(_) => HttpResponse::InternalServerError().body("Token generation failed"),
            },
            None => HttpResponse::InternalServerError().body("Failed to create user"),
        },
        Err(err) => match *err.kind {
            mongodb::error::ErrorKind::Write(error_info) => match error_info {
                mongodb::error::WriteFailure::WriteError(WriteError { code, .. }) => {
                    if code == 11000 {
                        HttpResponse::Conflict().body("User already exists")
                    } else {
                        log::error!("Signup write error code: {}", code);
                        HttpResponse::InternalServerError().body("Failed to create user")
                    }
                }
                _ => HttpResponse::InternalServerError().body("Failed to create user"),
            },
            _ => HttpResponse::InternalServerError().body("Failed to create user"),
        },
    }
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

pub async fn signin(data: web::Data<Arc<Client>>, input: web::Json<SigninRequest>) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<User> = client.database("Account").collection("Users");

    let doc = input.into_inner();
    let email = doc.email;

    let filter = doc! { "email": &email };

    match collection.find_one(filter).await {
        Ok(Some(user)) => {
            if bcrypt::verify(&doc.password, &user.password).unwrap_or(false) {
                let user_id = match user.id {
                    Some(id) => id,
                    None => {
                        log::error!("User document for {} has no _id", email);
                        return HttpResponse::InternalServerError().body("Failed to sign in.");
                    }
                };

                let update = doc! {
                    "$set": {
                        "last_signin": Utc::now().to_rfc3339(),
                        "failed_signins": 0
                    }
                };

                match collection.update_one(doc! { "email": &email }, update).await {
                    Ok(_) => match generate_token(&email, user_id) {
                        Ok(token) => HttpResponse::Ok().json(TokenResponse { auth_token: token }),
                        Err(_) => {
                            HttpResponse::InternalServerError().body("Token generation failed")
                        }
                    },
                    Err(err) => {
                        log::error!("Failed to update document: {:?}", err);
                        HttpResponse::InternalServerError().body("Failed to sign in.")
                    }
                }
            } else {
                let failed_signins = user.failed_signins.unwrap_or(0) + 1;
                let update = doc! {
                    "$set": { "failed_signins": failed_signins }
                };

                match collection.update_one(doc! { "email": &email }, update).await {
                    Ok(_) => HttpResponse::Unauthorized().body("Invalid credentials"),
                    Err(err) => {
                        log::error!("Failed to update failed signins: {:?}", err);
                        HttpResponse::InternalServerError().body("Failed to process signin")
                    }
                }
            }
        }
        Ok(None) => HttpResponse::NotFound().body("User not found"),
        Err(err) => {
            log::error!("Database error: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to process signin")
        }
    }
}

pub async fn user_session(
    claims: web::ReqData<Claims>,
    data: web::Data<Arc<Client>>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<User> = client.database("Account").collection("Users");

    let user_id = match ObjectId::parse_str(&claims.user_id) {
        Ok(user_id) => user_id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    match collection.find_one(doc! { "_id": user_id }).await {
        Ok(Some(user)) => {
            let user_session = UserSession {
                id: user_id,
                email: user.email,
                first_name: user.first_name.unwrap_or_default(),
                last_name: user.last_name.unwrap_or_default(),
                created_at: user.created_at.unwrap_or(chrono::DateTime::UNIX_EPOCH),
            };
            HttpResponse::Ok().json(user_session)
        }
        Ok(None) => HttpResponse::NotFound().body("User not found"),
        Err(err) => {
            log::error!("Failed to fetch user: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch user")
        }
    }
}

fn is_valid_email(email: &str) -> bool {
    let re = regex::Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?)*$",
    );
    match re {
        Ok(re) => re.is_match(email),
        Err(_) => false,
    }
}

fn generate_token(email: &str, user_id: ObjectId) -> Result<String, jsonwebtoken::errors::Error> {
    let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| "default_secret".to_string());
    let now = Utc::now();

    let claims = Claims {
        sub: email.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(24)).timestamp() as usize,
        user_id: user_id.to_string(),
    };

    let header = Header::new(Algorithm::HS256);
    encode(&header, &claims, &EncodingKey::from_secret(secret.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("traveler@example.com"));
        assert!(is_valid_email("a.b+tag@sub.domain.org"));
        assert!(!is_valid_email("invalid-email"));
        assert!(!is_valid_email("@nodomain"));
        assert!(!is_valid_email("user@"));
    }
}
