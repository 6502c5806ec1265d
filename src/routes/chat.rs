use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::services::chat_gateway::{ChatGateway, ChatMessage};

#[derive(Debug, Deserialize)]
pub struct ChatProxyRequest {
    pub messages: Vec<ChatMessage>,
    pub model: Option<String>,
}

/*
    POST /api/chat: one-route pass-through to the model provider. The
    provider-shaped payload comes back verbatim, status included, so the
    client reads choices[0].message.content exactly as it would upstream.
*/
pub async fn completions(
    gateway: web::Data<ChatGateway>,
    input: web::Json<ChatProxyRequest>,
) -> impl Responder {
    let body = input.into_inner();

    match gateway.forward(&body.messages, body.model.as_deref()).await {
        Ok(reply) => {
            let status =
                StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
            HttpResponse::build(status).json(reply.body)
        }
        Err(err) => {
            log::error!("Chat proxy request failed: {}", err);
            HttpResponse::BadGateway().json(json!({
                "error": "Failed to reach the model provider"
            }))
        }
    }
}
