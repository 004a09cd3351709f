//! Request dispatcher.
//!
//! Routes one request through the configured paths and always ends in
//! exactly one record:
//!
//! 1. no credential: fail immediately, nothing is sent
//! 2. agent configured: run the payload fallback chain; success returns
//!    without touching the synthesis endpoint
//! 3. otherwise, or after an agent failure: stream TTS audio to disk
//! 4. after a synthesis failure: the offline synthesizer, if one is available

use std::path::Path;

use reqwest::Client;
use tracing::{error, info, warn};

use crate::config::{RelayConfig, RelayMode};
use crate::core::agent::AgentClient;
use crate::core::stt::ElevenLabsSTT;
use crate::core::tts::{CommandSynthesizer, ElevenLabsTTS, OfflineSynthesizer, SynthesisRequest};
use crate::core::voices::count_voices;
use crate::errors::{RelayError, RelayOutcome};
use crate::output::{Method, RelayResult, TranscriptionRecord, VoiceCheck};
use crate::utils::{display_path, ensure_output_dir, offline_audio_path, write_audio};

/// Text synthesized on the text-to-speech path.
pub fn tts_reply(input: &str) -> String {
    format!("Hi! You said: {input}.")
}

/// Text synthesized on the offline path.
pub fn offline_reply(input: &str) -> String {
    format!("You said: {input}.")
}

/// Per-invocation request dispatcher.
pub struct Dispatcher<'a> {
    config: &'a RelayConfig,
    http_client: Client,
    offline: Option<Box<dyn OfflineSynthesizer>>,
}

impl<'a> Dispatcher<'a> {
    /// Create a dispatcher with the offline synthesizer named in `config`.
    pub fn new(config: &'a RelayConfig) -> RelayOutcome<Self> {
        let http_client = Client::builder()
            .build()
            .map_err(|e| RelayError::Network(format!("Failed to create HTTP client: {e}")))?;

        let offline = config
            .offline_command
            .as_ref()
            .map(|command| Box::new(CommandSynthesizer::new(command.clone())) as Box<dyn OfflineSynthesizer>);

        Ok(Self {
            config,
            http_client,
            offline,
        })
    }

    /// Replace the offline synthesizer (or remove it with `None`).
    pub fn with_offline(mut self, offline: Option<Box<dyn OfflineSynthesizer>>) -> Self {
        self.offline = offline;
        self
    }

    fn api_key(&self) -> RelayOutcome<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or(RelayError::MissingCredential)
    }

    /// Run the agent / synthesis / offline pipeline for `text`.
    pub async fn relay(&self, text: &str) -> RelayResult {
        let api_key = match self.api_key() {
            Ok(key) => key,
            Err(e) => {
                warn!("{}; no request sent", e);
                return RelayResult::failure(None, &e);
            }
        };

        let mut agent_error = None;
        if let RelayMode::Agent { agent_id } = self.config.mode() {
            match self.message_agent(api_key, agent_id, text).await {
                Ok(result) => return result,
                Err(e) => {
                    warn!("Agent path failed, falling back to text-to-speech: {}", e);
                    agent_error = Some(e);
                }
            }
        }

        let reply = tts_reply(text);
        let remote_error = match self.synthesize(api_key, &reply).await {
            Ok(path) => {
                return RelayResult::success(Method::TextToSpeech, reply, Some(display_path(&path)));
            }
            Err(e) => {
                error!("Text-to-speech failed: {} ({:?})", e, e);
                e
            }
        };

        let Some(offline) = self.offline.as_deref() else {
            return RelayResult::failure(Some(Method::TextToSpeech), &remote_error)
                .with_agent_error(agent_error.as_ref());
        };

        let offline_text = offline_reply(text);
        match self.synthesize_offline(offline, &offline_text).await {
            Ok(path) => {
                info!("Offline synthesis via {} succeeded", offline.name());
                RelayResult::success(Method::OfflineFallback, offline_text, Some(path))
            }
            Err(e) => {
                error!("Offline synthesis via {} failed: {}", offline.name(), e);
                RelayResult::failure(Some(Method::TextToSpeech), &remote_error)
                    .with_agent_error(agent_error.as_ref())
                    .with_fallback_error(&e)
            }
        }
    }

    async fn message_agent(
        &self,
        api_key: &str,
        agent_id: &str,
        text: &str,
    ) -> RelayOutcome<RelayResult> {
        let exchange = AgentClient::new(&self.http_client, &self.config.base_url, api_key, agent_id)
            .converse(text)
            .await?;

        let audio_path = match exchange.audio.as_deref() {
            Some(audio) => {
                let path = write_audio(&self.config.output_dir, "agent", "mp3", audio).await?;
                Some(display_path(&path))
            }
            None => None,
        };

        Ok(
            RelayResult::success(Method::Agent, exchange.reply_text, audio_path)
                .with_raw(exchange.raw),
        )
    }

    async fn synthesize(&self, api_key: &str, text: &str) -> RelayOutcome<std::path::PathBuf> {
        let request = SynthesisRequest {
            text,
            voice_id: &self.config.voice_id,
            model_id: &self.config.model_id,
            output_format: &self.config.output_format,
        };
        ElevenLabsTTS::new(&self.http_client, &self.config.base_url, api_key)
            .synthesize(&request, &self.config.output_dir)
            .await
    }

    async fn synthesize_offline(
        &self,
        offline: &dyn OfflineSynthesizer,
        text: &str,
    ) -> RelayOutcome<String> {
        ensure_output_dir(&self.config.output_dir).await?;
        let path = offline_audio_path(&self.config.output_dir);
        offline.synthesize(text, &path).await?;
        Ok(display_path(&path))
    }

    /// Connectivity check: list voices and report how many there are.
    pub async fn check_voices(&self) -> VoiceCheck {
        let result = match self.api_key() {
            Ok(api_key) => count_voices(&self.http_client, &self.config.base_url, api_key).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(count) => VoiceCheck::success(count),
            Err(e) => {
                warn!("Voice listing failed: {}", e);
                VoiceCheck::failure(&e)
            }
        }
    }

    async fn transcription(&self, path: &Path) -> RelayOutcome<crate::core::stt::Transcription> {
        let api_key = self.api_key()?;
        ElevenLabsSTT::new(
            &self.http_client,
            &self.config.base_url,
            api_key,
            &self.config.stt_model_id,
        )
        .transcribe_file(path)
        .await
    }

    /// Transcribe an audio file.
    pub async fn transcribe(&self, path: &Path) -> TranscriptionRecord {
        match self.transcription(path).await {
            Ok(transcription) => TranscriptionRecord::success(transcription),
            Err(e) => {
                error!("Transcription of {} failed: {}", path.display(), e);
                TranscriptionRecord::failure(&e)
            }
        }
    }

    /// Transcribe an audio file, then relay the transcript.
    pub async fn converse_audio(&self, path: &Path) -> RelayResult {
        match self.transcription(path).await {
            Ok(transcription) if transcription.text.trim().is_empty() => {
                warn!("Transcription of {} produced no text", path.display());
                RelayResult::failure(None, &RelayError::EmptyInput)
                    .with_transcript(transcription.text)
            }
            Ok(transcription) => {
                let transcript = transcription.text;
                self.relay(&transcript).await.with_transcript(transcript)
            }
            Err(e) => {
                error!("Transcription of {} failed: {}", path.display(), e);
                RelayResult::failure(None, &e)
            }
        }
    }
}
