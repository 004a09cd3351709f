pub mod agent;
pub mod elevenlabs;
pub mod stt;
pub mod tts;
pub mod voices;

// Re-export commonly used types for convenience
pub use agent::{AgentClient, AgentExchange, PayloadVariant, VariantAttempt, extract_reply_text};

pub use stt::{ElevenLabsSTT, Transcription};

pub use tts::{CommandSynthesizer, ElevenLabsTTS, OfflineSynthesizer, SynthesisRequest};

pub use voices::count_voices;
