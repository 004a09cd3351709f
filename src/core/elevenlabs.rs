//! Shared pieces of the ElevenLabs REST surface: base URL, auth header and
//! error-body handling used by the agent, TTS, STT and voices clients.

use reqwest::Response;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::RelayError;

/// Default ElevenLabs API base URL
pub const ELEVENLABS_API_URL: &str = "https://api.elevenlabs.io";

/// Authentication header carrying the API key
pub const API_KEY_HEADER: &str = "xi-api-key";

/// ElevenLabs error response: `{"detail": {"status": ..., "message": ...}}`
/// or `{"detail": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    detail: ErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Structured {
        #[serde(default)]
        status: Option<String>,
        #[serde(default)]
        message: Option<String>,
    },
    Plain(String),
    Other(Value),
}

/// Parse a response body as JSON when possible, otherwise keep the raw text.
pub fn body_to_value(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Human-readable message for an error body.
pub fn error_message(body: &Value, fallback: &str) -> String {
    let Ok(parsed) = ErrorResponse::deserialize(body) else {
        return match body {
            Value::String(s) if !s.is_empty() => s.clone(),
            _ => fallback.to_string(),
        };
    };

    match parsed.detail {
        ErrorDetail::Structured {
            status: Some(status),
            message: Some(message),
        } => format!("{message} ({status})"),
        ErrorDetail::Structured {
            message: Some(message),
            ..
        } => message,
        ErrorDetail::Structured {
            status: Some(status),
            ..
        } => status,
        ErrorDetail::Plain(message) => message,
        ErrorDetail::Structured { .. } | ErrorDetail::Other(_) => fallback.to_string(),
    }
}

/// Consume a non-success response into [`RelayError::Api`].
pub async fn api_error(response: Response) -> RelayError {
    let status = response.status();
    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => return RelayError::Network(format!("Failed to read error response: {e}")),
    };
    let body = body_to_value(&text);
    let message = error_message(&body, status.canonical_reason().unwrap_or("request failed"));
    RelayError::Api {
        status: status.as_u16(),
        message,
        body,
    }
}

/// Join the configured base URL and an API path.
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
