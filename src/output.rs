//! Result records and the single-write formatter.
//!
//! Every invocation prints exactly one JSON object on stdout. Callers parse
//! it regardless of logical success and branch on `success`, so a failed
//! pipeline still exits 0; only the top-level boundary in the binary ever
//! changes the exit code.

use std::io::Write;

use serde::Serialize;
use serde_json::{Value, json};

use crate::core::stt::Transcription;
use crate::errors::{ErrorCategory, RelayError};

/// Which path produced the record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    Agent,
    TextToSpeech,
    OfflineFallback,
}

/// Outcome of the agent / synthesis pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelayResult {
    pub success: bool,
    pub response_text: String,
    /// Set only when audio was produced and written
    pub audio_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<Method>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_category: Option<ErrorCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// Agent-path failure that preceded a synthesis failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_error: Option<Value>,
    /// Offline-fallback failure that followed the remote failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_error: Option<Value>,
    /// Provider response the reply text was normalized from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
    /// Transcript the input text came from, for audio input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

impl RelayResult {
    pub fn success(method: Method, response_text: String, audio_path: Option<String>) -> Self {
        Self {
            success: true,
            response_text,
            audio_path,
            method: Some(method),
            error: None,
            error_category: None,
            details: None,
            agent_error: None,
            fallback_error: None,
            raw: None,
            transcript: None,
        }
    }

    pub fn failure(method: Option<Method>, error: &RelayError) -> Self {
        Self {
            success: false,
            response_text: String::new(),
            audio_path: None,
            method,
            error: Some(error.to_string()),
            error_category: Some(error.category()),
            details: Some(error.details()),
            agent_error: None,
            fallback_error: None,
            raw: None,
            transcript: None,
        }
    }

    /// `{"success": false, "error": "No input provided", ...}`
    pub fn usage_error() -> Self {
        Self {
            details: None,
            ..Self::failure(None, &RelayError::EmptyInput)
        }
    }

    pub fn with_agent_error(mut self, agent_error: Option<&RelayError>) -> Self {
        self.agent_error = agent_error.map(RelayError::to_json);
        self
    }

    pub fn with_fallback_error(mut self, fallback_error: &RelayError) -> Self {
        self.fallback_error = Some(fallback_error.to_json());
        self
    }

    pub fn with_raw(mut self, raw: Value) -> Self {
        self.raw = Some(raw);
        self
    }

    pub fn with_transcript(mut self, transcript: String) -> Self {
        self.transcript = Some(transcript);
        self
    }
}

/// Outcome of the `test` connectivity check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceCheck {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_category: Option<ErrorCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl VoiceCheck {
    pub fn success(voice_count: usize) -> Self {
        Self {
            success: true,
            voice_count: Some(voice_count),
            error: None,
            error_category: None,
            details: None,
        }
    }

    pub fn failure(error: &RelayError) -> Self {
        Self {
            success: false,
            voice_count: None,
            error: Some(error.to_string()),
            error_category: Some(error.category()),
            details: Some(error.details()),
        }
    }
}

/// Outcome of a transcription
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptionRecord {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_category: Option<ErrorCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl TranscriptionRecord {
    pub fn success(transcription: Transcription) -> Self {
        Self {
            success: true,
            transcript: Some(transcription.text),
            language_code: transcription.language_code,
            raw: Some(transcription.raw),
            error: None,
            error_category: None,
            details: None,
        }
    }

    pub fn failure(error: &RelayError) -> Self {
        Self {
            success: false,
            transcript: None,
            language_code: None,
            raw: None,
            error: Some(error.to_string()),
            error_category: Some(error.category()),
            details: Some(error.details()),
        }
    }
}

/// Serialize `record` as one JSON line into `writer`.
pub fn write_record<W: Write, T: Serialize>(writer: &mut W, record: &T) -> std::io::Result<()> {
    let line = serde_json::to_string(record).map_err(std::io::Error::other)?;
    writeln!(writer, "{line}")?;
    writer.flush()
}

/// Serialize `record` as the process's single stdout line.
pub fn emit<T: Serialize>(record: &T) -> std::io::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    write_record(&mut handle, record)
}

/// Last-resort record for the top-level boundary. Built from a `Value`, so
/// producing it cannot fail.
pub fn fatal_record(error: &str, details: &str) -> String {
    json!({
        "success": false,
        "error": error,
        "error_category": ErrorCategory::UnknownError,
        "details": details,
    })
    .to_string()
}
