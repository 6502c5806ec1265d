use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::error::Error;
use std::fmt;

/// OpenAI-compatible chat-completions endpoint used when LLM_API_URL is unset.
const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug)]
pub enum GatewayError {
    EnvironmentError(String),
    NetworkError(reqwest::Error),
    StatusError { status: u16, body: String },
    MalformedResponse(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::EnvironmentError(msg) => write!(f, "Environment error: {}", msg),
            GatewayError::NetworkError(err) => write!(f, "Network error: {}", err),
            GatewayError::StatusError { status, body } => {
                write!(f, "Provider returned status {}: {}", status, body)
            }
            GatewayError::MalformedResponse(msg) => {
                write!(f, "Malformed provider response: {}", msg)
            }
        }
    }
}

impl Error for GatewayError {}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::NetworkError(err)
    }
}

/// Raw provider reply, passed through verbatim by the /api/chat proxy route.
#[derive(Debug)]
pub struct ProviderReply {
    pub status: u16,
    pub body: Value,
}

/// Stateless transport to the hosted chat-completion provider. One round
/// trip per call, no retries, no caching; reuse-vs-regenerate lives in the
/// staleness layer above.
#[derive(Clone)]
pub struct ChatGateway {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl ChatGateway {
    pub fn from_env() -> Result<Self, GatewayError> {
        let api_key = env::var("LLM_API_KEY")
            .map_err(|_| GatewayError::EnvironmentError("LLM_API_KEY not set".to_string()))?;

        let api_url = env::var("LLM_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let model = env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self {
            client: Client::new(),
            api_url,
            api_key,
            model,
        })
    }

    fn build_request_body(&self, messages: &[ChatMessage], model_override: Option<&str>) -> Value {
        serde_json::json!({
            "model": model_override.unwrap_or(&self.model),
            "messages": messages,
        })
    }

    /// Sends the message list and returns the model's reply text
    /// (`choices[0].message.content`).
    pub async fn send(&self, messages: &[ChatMessage]) -> Result<String, GatewayError> {
        let request = self.build_request_body(messages, None);

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GatewayError::StatusError {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(format!("Failed to parse response: {}", e)))?;

        match payload["choices"][0]["message"]["content"].as_str() {
            Some(content) => Ok(content.to_string()),
            None => Err(GatewayError::MalformedResponse(
                "choices[0].message.content missing from provider payload".to_string(),
            )),
        }
    }

    /// Pass-through for POST /api/chat: forwards the request and hands the
    /// provider-shaped body and status back verbatim, including provider
    /// error payloads. Only transport failures surface as errors.
    pub async fn forward(
        &self,
        messages: &[ChatMessage],
        model_override: Option<&str>,
    ) -> Result<ProviderReply, GatewayError> {
        let request = self.build_request_body(messages, model_override);

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(format!("Failed to parse response: {}", e)))?;

        Ok(ProviderReply { status, body })
    }

    /// True when the provider credential is configured; used by the health
    /// endpoint.
    pub fn masked_key(&self) -> String {
        if self.api_key.len() > 8 {
            format!("{}***{}", &self.api_key[0..4], &self.api_key[self.api_key.len() - 4..])
        } else {
            "***".to_string()
        }
    }
}
