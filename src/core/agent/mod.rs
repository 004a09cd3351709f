//! ElevenLabs conversational agent integration.
//!
//! The agent is messaged through the simulate-conversation endpoint:
//!
//! - [`payload`]: the ordered request shapes tried against the endpoint
//! - [`messages`]: response decoding and reply-text normalization
//! - [`client`]: the fallback chain itself
//!
//! # API Reference
//!
//! - Endpoint: `POST /v1/convai/agents/{agent_id}/simulate-conversation`
//! - Auth: `xi-api-key` header
//! - Timeout: 60 seconds per variant

mod client;
mod messages;
mod payload;


pub use client::{AGENT_TIMEOUT, AgentClient};
pub use messages::{AgentExchange, AgentReply, VariantAttempt, extract_audio, extract_reply_text};
pub use payload::PayloadVariant;
