//! Text-to-speech: the ElevenLabs streaming provider and the local offline
//! fallback.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use voice_relay::core::tts::{ElevenLabsTTS, SynthesisRequest, DEFAULT_OUTPUT_FORMAT, DEFAULT_TTS_MODEL};
//!
//! # async fn example() -> Result<(), voice_relay::RelayError> {
//! let client = reqwest::Client::new();
//! let tts = ElevenLabsTTS::new(&client, "https://api.elevenlabs.io", "your-api-key");
//! let path = tts
//!     .synthesize(
//!         &SynthesisRequest {
//!             text: "Hello, world!",
//!             voice_id: "21m00Tcm4TlvDq8ikWAM",
//!             model_id: DEFAULT_TTS_MODEL,
//!             output_format: DEFAULT_OUTPUT_FORMAT,
//!         },
//!         Path::new("temp_audio"),
//!     )
//!     .await?;
//! println!("audio at {}", path.display());
//! # Ok(())
//! # }
//! ```

pub mod offline;
mod provider;

pub use offline::{CommandSynthesizer, DEFAULT_OFFLINE_COMMAND, OfflineSynthesizer};
pub use provider::{
    DEFAULT_OUTPUT_FORMAT, DEFAULT_TTS_MODEL, DEFAULT_VOICE_ID, ElevenLabsTTS, SynthesisRequest,
    file_extension,
};
