//! Response types for the agent simulate-conversation endpoint.
//!
//! The provider returns either a "structured" conversation (a `messages`
//! list whose entries carry role and content blocks) or a "simple" object
//! with a top-level reply field. Neither shape is contractually fixed, so
//! decoding is attempted shape by shape and falls through to an empty reply.

use base64::Engine;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::payload::PayloadVariant;

/// Roles whose messages count as the agent speaking.
const AGENT_ROLES: [&str; 4] = ["assistant", "agent", "system", "bot"];

/// Content block types that carry reply text.
const TEXT_BLOCK_TYPES: [&str; 2] = ["output_text", "text"];

// =============================================================================
// Lenient field decoding
// =============================================================================

/// A field that decodes as `T` when it can and is otherwise ignored, so one
/// odd entry never fails the surrounding shape.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Valid(T),
    Invalid(IgnoredAny),
}

impl<T> Lenient<T> {
    fn valid(&self) -> Option<&T> {
        match self {
            Lenient::Valid(v) => Some(v),
            Lenient::Invalid(_) => None,
        }
    }
}

fn valid<T>(field: &Option<Lenient<T>>) -> Option<&T> {
    field.as_ref().and_then(Lenient::valid)
}

// =============================================================================
// Structured shape
// =============================================================================

#[derive(Debug, Deserialize)]
struct StructuredReply {
    messages: Vec<Lenient<ReplyMessage>>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    role: Option<Lenient<String>>,
    #[serde(default)]
    content: Option<MessageContent>,
    #[serde(default)]
    text: Option<Lenient<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MessageContent {
    Blocks(Vec<Lenient<ContentBlock>>),
    Plain(String),
    Other(IgnoredAny),
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type", default)]
    kind: Option<Lenient<String>>,
    #[serde(default)]
    text: Option<Lenient<String>>,
}

impl ReplyMessage {
    fn is_agent(&self) -> bool {
        valid(&self.role).is_some_and(|role| AGENT_ROLES.contains(&role.as_str()))
    }

    fn reply_text(&self) -> Option<&str> {
        match &self.content {
            Some(MessageContent::Blocks(blocks)) => blocks
                .iter()
                .filter_map(Lenient::valid)
                .find(|block| {
                    valid(&block.kind).is_some_and(|k| TEXT_BLOCK_TYPES.contains(&k.as_str()))
                        && valid(&block.text).is_some()
                })
                .and_then(|block| valid(&block.text))
                .or_else(|| valid(&self.text))
                .map(String::as_str),
            Some(MessageContent::Plain(text)) => Some(text.as_str()),
            _ => valid(&self.text).map(String::as_str),
        }
    }
}

impl StructuredReply {
    fn last_agent_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .filter_map(Lenient::valid)
            .filter(|m| m.is_agent())
            .filter_map(ReplyMessage::reply_text)
            .find(|text| !text.is_empty())
    }
}

// =============================================================================
// Simple shape
// =============================================================================

#[derive(Debug, Deserialize)]
struct SimpleReply {
    #[serde(default)]
    response: Option<Lenient<String>>,
    #[serde(default)]
    text: Option<Lenient<String>>,
    #[serde(default)]
    message: Option<Lenient<String>>,
}

impl SimpleReply {
    fn text(&self) -> Option<&str> {
        valid(&self.response)
            .or_else(|| valid(&self.text))
            .or_else(|| valid(&self.message))
            .map(String::as_str)
    }
}

// =============================================================================
// Normalizer
// =============================================================================

/// Reply shapes in the order they are tried.
#[derive(Debug)]
pub enum AgentReply {
    Structured(String),
    Simple(String),
    Empty,
}

impl AgentReply {
    /// Decode `raw` into the first shape that yields text.
    pub fn decode(raw: &Value) -> Self {
        if let Ok(structured) = StructuredReply::deserialize(raw) {
            if let Some(text) = structured.last_agent_text() {
                return AgentReply::Structured(text.to_string());
            }
        }
        if let Ok(simple) = SimpleReply::deserialize(raw) {
            if let Some(text) = simple.text() {
                return AgentReply::Simple(text.to_string());
            }
        }
        AgentReply::Empty
    }

    pub fn into_text(self) -> String {
        match self {
            AgentReply::Structured(text) | AgentReply::Simple(text) => text,
            AgentReply::Empty => String::new(),
        }
    }
}

/// Best-effort reply text from an agent response, or an empty string.
pub fn extract_reply_text(raw: &Value) -> String {
    AgentReply::decode(raw).into_text()
}

// =============================================================================
// Audio
// =============================================================================

#[derive(Debug, Deserialize)]
struct AudioPayload {
    #[serde(default)]
    audio: Option<Lenient<String>>,
    #[serde(default)]
    audio_base64: Option<Lenient<String>>,
}

/// Decode base64 audio attached to an agent response, if any.
pub fn extract_audio(raw: &Value) -> Option<Vec<u8>> {
    let payload = AudioPayload::deserialize(raw).ok()?;
    let encoded = valid(&payload.audio).or_else(|| valid(&payload.audio_base64))?;
    if encoded.is_empty() {
        return None;
    }
    match base64::engine::general_purpose::STANDARD.decode(encoded) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::warn!("Ignoring undecodable agent audio: {}", e);
            None
        }
    }
}

// =============================================================================
// Attempt bookkeeping
// =============================================================================

/// Outcome of sending one payload variant.
#[derive(Debug, Clone, Serialize)]
pub struct VariantAttempt {
    pub variant: PayloadVariant,
    /// HTTP status, absent when the request never got a response
    pub status: Option<u16>,
    pub body: Value,
}

/// A successful agent exchange.
#[derive(Debug, Clone)]
pub struct AgentExchange {
    /// Variant that the endpoint accepted
    pub variant: PayloadVariant,
    pub reply_text: String,
    pub raw: Value,
    pub audio: Option<Vec<u8>>,
}
