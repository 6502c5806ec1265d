pub mod account;
pub mod chat;
pub mod health;
pub mod packing;
pub mod recommendation;
pub mod saved_itinerary;
pub mod trip;

use actix_web::{HttpRequest, HttpResponse};

/// Header carrying the anonymous browsing-session identifier. The client
/// generates it once and sends it with every wizard request.
pub const SESSION_HEADER: &str = "X-Session-Id";

pub fn session_id(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(|value| value.to_string())
}

pub fn require_session(req: &HttpRequest) -> Result<String, HttpResponse> {
    session_id(req)
        .ok_or_else(|| HttpResponse::BadRequest().body("Missing X-Session-Id header"))
}
