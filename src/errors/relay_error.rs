//! Error types shared by every relay path.
//!
//! Nothing in the library propagates a failure out of the process: each
//! [`RelayError`] is eventually folded into a result record, and its
//! [`ErrorCategory`] is what the calling orchestrator branches on.

use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::config::ConfigError;
use crate::core::agent::VariantAttempt;

/// Result type for relay operations
pub type RelayOutcome<T> = Result<T, RelayError>;

/// Machine-readable failure category written to `error_category`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    UsageError,
    ConfigurationError,
    MissingCredential,
    MissingVoiceId,
    ProviderApiError,
    TransportError,
    IoError,
    OfflineFallbackError,
    UnknownError,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UsageError => "usage_error",
            Self::ConfigurationError => "configuration_error",
            Self::MissingCredential => "missing_credential",
            Self::MissingVoiceId => "missing_voice_id",
            Self::ProviderApiError => "provider_api_error",
            Self::TransportError => "transport_error",
            Self::IoError => "io_error",
            Self::OfflineFallbackError => "offline_fallback_error",
            Self::UnknownError => "unknown_error",
        }
    }
}

/// Every failure the relay can report.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Nothing to relay, e.g. a blank transcript
    #[error("No input provided")]
    EmptyInput,

    #[error("Invalid configuration: {0}")]
    Configuration(#[from] ConfigError),

    /// No API credential configured; no request is ever sent in this state
    #[error("Missing ELEVENLABS_API_KEY")]
    MissingCredential,

    /// Voice id resolved to an empty string
    #[error("Missing ELEVENLABS_VOICE_ID")]
    MissingVoiceId,

    /// The provider answered with an error status
    #[error("ElevenLabs API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        body: Value,
    },

    /// Every agent payload variant was rejected
    #[error(
        "Agent API error: {count} payload variant(s) rejected, last status {last}",
        count = .attempts.len(),
        last = .status.map_or_else(|| "none".to_string(), |s| s.to_string())
    )]
    AgentChainExhausted {
        status: Option<u16>,
        body: Value,
        attempts: Vec<VariantAttempt>,
    },

    /// Connection, TLS or timeout failure
    #[error("Request failed: {0}")]
    Network(String),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Offline synthesis failed: {0}")]
    Offline(String),

    /// The provider answered successfully but the body could not be used
    #[error("Failed to parse response: {0}")]
    InvalidResponse(String),
}

impl RelayError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptyInput => ErrorCategory::UsageError,
            Self::Configuration(_) => ErrorCategory::ConfigurationError,
            Self::MissingCredential => ErrorCategory::MissingCredential,
            Self::MissingVoiceId => ErrorCategory::MissingVoiceId,
            Self::Api { .. } | Self::AgentChainExhausted { .. } => ErrorCategory::ProviderApiError,
            Self::Network(_) => ErrorCategory::TransportError,
            Self::Io(_) => ErrorCategory::IoError,
            Self::Offline(_) => ErrorCategory::OfflineFallbackError,
            Self::InvalidResponse(_) => ErrorCategory::UnknownError,
        }
    }

    /// Supplementary detail for the `details` field: the raw provider body
    /// when there is one, otherwise the error text.
    pub fn details(&self) -> Value {
        match self {
            Self::Api { body, .. } => body.clone(),
            Self::AgentChainExhausted {
                status,
                body,
                attempts,
            } => json!({
                "status": status,
                "body": body,
                "attempts": attempts,
            }),
            other => Value::String(other.to_string()),
        }
    }

    /// Compact `{error, error_category, details}` object used when one
    /// failure is nested inside another record.
    pub fn to_json(&self) -> Value {
        json!({
            "error": self.to_string(),
            "error_category": self.category(),
            "details": self.details(),
        })
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RelayError::Network(format!("Request timed out: {e}"))
        } else {
            RelayError::Network(e.to_string())
        }
    }
}
