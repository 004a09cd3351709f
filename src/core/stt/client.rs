//! ElevenLabs STT client.
//!
//! ElevenLabs speech-to-text is a REST batch API: the whole audio file is
//! uploaded as multipart form data and the transcript comes back as JSON.

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use reqwest::multipart::{Form, Part};
use tracing::info;

use super::messages::Transcription;
use crate::core::elevenlabs::{API_KEY_HEADER, api_error, body_to_value, endpoint};
use crate::errors::{RelayError, RelayOutcome};

/// Upload and transcription timeout
pub const STT_TIMEOUT: Duration = Duration::from_secs(300);

/// Default transcription model
pub const DEFAULT_STT_MODEL: &str = "scribe_v1";

/// MIME type for an audio file, by extension.
pub fn mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "mp3" | "mpeg" | "mpga" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "webm" => "audio/webm",
        "m4a" | "mp4" => "audio/mp4",
        "flac" => "audio/flac",
        _ => "application/octet-stream",
    }
}

/// ElevenLabs speech-to-text client.
pub struct ElevenLabsSTT<'a> {
    http_client: &'a Client,
    base_url: &'a str,
    api_key: &'a str,
    model_id: &'a str,
    timeout: Duration,
}

impl<'a> ElevenLabsSTT<'a> {
    pub fn new(
        http_client: &'a Client,
        base_url: &'a str,
        api_key: &'a str,
        model_id: &'a str,
    ) -> Self {
        Self {
            http_client,
            base_url,
            api_key,
            model_id,
            timeout: STT_TIMEOUT,
        }
    }

    /// Upload `path` and return its transcript.
    pub async fn transcribe_file(&self, path: &Path) -> RelayOutcome<Transcription> {
        let audio = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());

        info!(
            "Uploading {} bytes of audio from {} for transcription",
            audio.len(),
            path.display()
        );

        let file_part = Part::bytes(audio)
            .file_name(file_name)
            .mime_str(mime_type(path))
            .map_err(|e| RelayError::InvalidResponse(format!("Invalid MIME type: {e}")))?;

        let form = Form::new()
            .part("file", file_part)
            .text("model_id", self.model_id.to_string());

        let response = self
            .http_client
            .post(endpoint(self.base_url, "/v1/speech-to-text/convert"))
            .header(API_KEY_HEADER, self.api_key)
            .timeout(self.timeout)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let text = response
            .text()
            .await
            .map_err(|e| RelayError::Network(format!("Failed to read response: {e}")))?;
        let raw = body_to_value(&text);
        if !raw.is_object() {
            return Err(RelayError::InvalidResponse(format!(
                "expected a JSON object, got: {text}"
            )));
        }

        let transcription = Transcription::from_raw(raw);
        info!(
            "Transcription complete: {} characters",
            transcription.text.len()
        );
        Ok(transcription)
    }
}
