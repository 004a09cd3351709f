//! ElevenLabs speech-to-text integration.
//!
//! # API Reference
//!
//! - Endpoint: `POST /v1/speech-to-text/convert` (multipart: `file`, `model_id`)
//! - Default model: `scribe_v1`
//! - Timeout: 300 seconds

mod client;
mod messages;

pub use client::{DEFAULT_STT_MODEL, ElevenLabsSTT, STT_TIMEOUT, mime_type};
pub use messages::{Transcription, TranscriptionResponse};
