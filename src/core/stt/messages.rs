//! Response types for the ElevenLabs speech-to-text API.

use serde::Deserialize;
use serde_json::Value;

/// Transcription response. Only the transcript is relied on; the full body is
/// kept alongside it as `raw`.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionResponse {
    #[serde(default)]
    pub text: Option<String>,

    /// Older responses name the field `transcript`
    #[serde(default)]
    pub transcript: Option<String>,

    /// ISO-639 language code the provider detected
    #[serde(default)]
    pub language_code: Option<String>,
}

/// A completed transcription.
#[derive(Debug, Clone)]
pub struct Transcription {
    pub text: String,
    pub language_code: Option<String>,
    pub raw: Value,
}

impl Transcription {
    pub fn from_raw(raw: Value) -> Self {
        let parsed = TranscriptionResponse::deserialize(&raw).ok();
        let (text, language_code) = match parsed {
            Some(r) => (r.text.or(r.transcript).unwrap_or_default(), r.language_code),
            None => (String::new(), None),
        };
        Self {
            text,
            language_code,
            raw,
        }
    }
}
