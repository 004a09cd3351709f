//! ElevenLabs streaming TTS provider.
//!
//! # API Reference
//!
//! - Endpoint: `POST /v1/text-to-speech/{voice_id}/stream?output_format=...`
//! - Body: `{"text": ..., "model_id": ...}`
//! - Output: chunked audio in the requested format

use std::path::{Path, PathBuf};

use futures::StreamExt;
use reqwest::Client;
use serde_json::json;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::core::elevenlabs::{API_KEY_HEADER, api_error, endpoint};
use crate::errors::{RelayError, RelayOutcome};
use crate::utils::{ensure_output_dir, unique_audio_path};

/// Default multilingual model
pub const DEFAULT_TTS_MODEL: &str = "eleven_multilingual_v2";

/// Default output format (MP3, 44.1kHz, 128kbps)
pub const DEFAULT_OUTPUT_FORMAT: &str = "mp3_44100_128";

/// Default voice used when none is configured
pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";

/// File extension for an ElevenLabs `output_format` value such as
/// `mp3_44100_128`, `pcm_16000` or `ulaw_8000`.
pub fn file_extension(output_format: &str) -> &'static str {
    let codec = output_format
        .split('_')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    match codec.as_str() {
        "pcm" => "pcm",
        "ulaw" => "ulaw",
        "alaw" => "alaw",
        "opus" => "opus",
        "wav" => "wav",
        _ => "mp3",
    }
}

/// One synthesis request.
#[derive(Debug, Clone)]
pub struct SynthesisRequest<'a> {
    pub text: &'a str,
    pub voice_id: &'a str,
    pub model_id: &'a str,
    pub output_format: &'a str,
}

/// ElevenLabs TTS over the streaming endpoint.
pub struct ElevenLabsTTS<'a> {
    http_client: &'a Client,
    base_url: &'a str,
    api_key: &'a str,
}

impl<'a> ElevenLabsTTS<'a> {
    pub fn new(http_client: &'a Client, base_url: &'a str, api_key: &'a str) -> Self {
        Self {
            http_client,
            base_url,
            api_key,
        }
    }

    fn url(&self, voice_id: &str) -> String {
        endpoint(self.base_url, &format!("/v1/text-to-speech/{voice_id}/stream"))
    }

    /// Synthesize `request` into a new `tts_<hex>` file under `output_dir`.
    pub async fn synthesize(
        &self,
        request: &SynthesisRequest<'_>,
        output_dir: &Path,
    ) -> RelayOutcome<PathBuf> {
        if request.voice_id.trim().is_empty() {
            return Err(RelayError::MissingVoiceId);
        }

        let response = self
            .http_client
            .post(self.url(request.voice_id))
            .header(API_KEY_HEADER, self.api_key)
            .header("Content-Type", "application/json")
            .query(&[("output_format", request.output_format)])
            .json(&json!({
                "text": request.text,
                "model_id": request.model_id,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        ensure_output_dir(output_dir).await?;
        let path = unique_audio_path(output_dir, "tts", file_extension(request.output_format));

        match stream_to_file(response, &path).await {
            Ok(bytes) => {
                info!("Wrote {} bytes of synthesized audio to {}", bytes, path.display());
                Ok(path)
            }
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                    debug!("Could not remove partial audio file: {}", remove_err);
                }
                Err(e)
            }
        }
    }
}

async fn stream_to_file(response: reqwest::Response, path: &Path) -> RelayOutcome<u64> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            warn!("TTS stream interrupted after {} bytes", written);
            RelayError::from(e)
        })?;
        if chunk.is_empty() {
            continue;
        }
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    if written == 0 {
        return Err(RelayError::InvalidResponse(
            "TTS stream returned no audio".to_string(),
        ));
    }
    Ok(written)
}
