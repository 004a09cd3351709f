//! End-to-end tests for the relay pipeline against a mock ElevenLabs API
//!
//! These tests verify:
//! - The credential check happens before any request
//! - The agent payload chain stops at the first accepted variant
//! - Agent failures fall through to text-to-speech
//! - Synthesis failures fall through to the offline synthesizer
//! - Failure records carry the nested agent and fallback errors

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{any, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use voice_relay::core::agent::{AgentClient, PayloadVariant};
use voice_relay::core::tts::OfflineSynthesizer;
use voice_relay::{Dispatcher, ErrorCategory, Method, RelayConfig, RelayError, RelayOutcome};

const AGENT_PATH: &str = "/v1/convai/agents/agent_1/simulate-conversation";
const TTS_PATH: &str = "/v1/text-to-speech/21m00Tcm4TlvDq8ikWAM/stream";

fn test_config(server: &MockServer, output_dir: &Path, agent_id: Option<&str>) -> RelayConfig {
    RelayConfig {
        api_key: Some("test-key".to_string()),
        agent_id: agent_id.map(str::to_string),
        base_url: server.uri(),
        output_dir: output_dir.to_path_buf(),
        offline_command: None,
        ..RelayConfig::default()
    }
}

fn user_turn(text: &str) -> Value {
    json!([{ "role": "user", "content": [{ "type": "input_text", "text": text }] }])
}

fn variant_one(text: &str) -> Value {
    json!({ "simulation_specification": { "messages": user_turn(text) } })
}

fn variant_two(text: &str) -> Value {
    json!({
        "simulation_specification": {
            "simulated_user_config": { "messages": user_turn(text) }
        }
    })
}

fn variant_three(text: &str) -> Value {
    json!({ "messages": user_turn(text) })
}

/// Offline synthesizer that records the text it was asked to speak
struct StubSynthesizer {
    fail: bool,
    spoken: Mutex<Vec<String>>,
}

impl StubSynthesizer {
    fn boxed(fail: bool) -> Box<dyn OfflineSynthesizer> {
        Box::new(Self {
            fail,
            spoken: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl OfflineSynthesizer for StubSynthesizer {
    async fn synthesize(&self, text: &str, path: &Path) -> RelayOutcome<()> {
        self.spoken.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(RelayError::Offline("stub synthesizer unavailable".to_string()));
        }
        tokio::fs::write(path, b"RIFF").await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "stub"
    }
}

#[tokio::test]
async fn test_missing_credential_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = RelayConfig {
        api_key: None,
        ..test_config(&server, dir.path(), Some("agent_1"))
    };
    let dispatcher = Dispatcher::new(&config)
        .unwrap()
        .with_offline(Some(StubSynthesizer::boxed(false)));

    let result = dispatcher.relay("hello").await;

    assert!(!result.success);
    assert_eq!(result.error_category, Some(ErrorCategory::MissingCredential));
    assert!(result.audio_path.is_none());
}

#[tokio::test]
async fn test_text_to_speech_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TTS_PATH))
        .and(query_param("output_format", "mp3_44100_128"))
        .and(header("xi-api-key", "test-key"))
        .and(body_partial_json(json!({
            "text": "Hi! You said: hello.",
            "model_id": "eleven_multilingual_v2"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3fake-mp3".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path(), None);
    let dispatcher = Dispatcher::new(&config).unwrap();

    let result = dispatcher.relay("hello").await;

    assert!(result.success);
    assert_eq!(result.method, Some(Method::TextToSpeech));
    assert!(result.response_text.contains("hello"));
    let audio_path = PathBuf::from(result.audio_path.unwrap());
    assert!(audio_path.to_string_lossy().ends_with(".mp3"));
    assert!(audio_path.starts_with(dir.path()));
    assert_eq!(std::fs::read(&audio_path).unwrap(), b"ID3fake-mp3");
}

#[tokio::test]
async fn test_agent_success_skips_synthesis() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(AGENT_PATH))
        .and(body_partial_json(variant_one("hello")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [
                { "role": "user", "content": "hello" },
                { "role": "assistant", "content": [{ "type": "output_text", "text": "y" }] }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mp3".to_vec()))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path(), Some("agent_1"));
    let dispatcher = Dispatcher::new(&config).unwrap();

    let result = dispatcher.relay("hello").await;

    assert!(result.success);
    assert_eq!(result.method, Some(Method::Agent));
    assert_eq!(result.response_text, "y");
    assert!(result.audio_path.is_none());
    assert!(result.raw.is_some());
}

#[tokio::test]
async fn test_agent_chain_stops_at_first_accepted_variant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(AGENT_PATH))
        .and(body_partial_json(variant_one("hello")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "simulation_specification.messages is not allowed"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(AGENT_PATH))
        .and(body_partial_json(variant_two("hello")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "z" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(AGENT_PATH))
        .and(body_partial_json(variant_three("hello")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "never" })))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path(), Some("agent_1"));
    let dispatcher = Dispatcher::new(&config).unwrap();

    let result = dispatcher.relay("hello").await;

    assert!(result.success);
    assert_eq!(result.method, Some(Method::Agent));
    assert_eq!(result.response_text, "z");
}

#[tokio::test]
async fn test_agent_audio_is_written() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(AGENT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "spoken reply",
            "audio_base64": "SUQz"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path(), Some("agent_1"));
    let dispatcher = Dispatcher::new(&config).unwrap();

    let result = dispatcher.relay("hello").await;

    assert!(result.success);
    let audio_path = PathBuf::from(result.audio_path.unwrap());
    let name = audio_path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("agent_"));
    assert!(name.ends_with(".mp3"));
    assert_eq!(std::fs::read(&audio_path).unwrap(), b"ID3");
}

#[tokio::test]
async fn test_agent_failure_falls_back_to_synthesis() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(AGENT_PATH))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({ "detail": "invalid" })))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mp3".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path(), Some("agent_1"));
    let dispatcher = Dispatcher::new(&config).unwrap();

    let result = dispatcher.relay("hello").await;

    assert!(result.success);
    assert_eq!(result.method, Some(Method::TextToSpeech));
    assert_eq!(result.response_text, "Hi! You said: hello.");
    assert!(result.agent_error.is_none());
}

#[tokio::test]
async fn test_offline_fallback_after_remote_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(AGENT_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TTS_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": { "status": "invalid_api_key", "message": "Invalid API key" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path(), Some("agent_1"));
    let dispatcher = Dispatcher::new(&config)
        .unwrap()
        .with_offline(Some(StubSynthesizer::boxed(false)));

    let result = dispatcher.relay("hello").await;

    assert!(result.success);
    assert_eq!(result.method, Some(Method::OfflineFallback));
    assert_eq!(result.response_text, "You said: hello.");
    let audio_path = result.audio_path.unwrap();
    assert!(audio_path.ends_with("offline_fallback.wav"));
    assert!(Path::new(&audio_path).exists());
}

#[tokio::test]
async fn test_total_failure_reports_every_stage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(AGENT_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "agent not found" })))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TTS_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("tts down"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path(), Some("agent_1"));
    let dispatcher = Dispatcher::new(&config)
        .unwrap()
        .with_offline(Some(StubSynthesizer::boxed(true)));

    let result = dispatcher.relay("hello").await;

    assert!(!result.success);
    assert!(result.audio_path.is_none());
    assert_eq!(result.error_category, Some(ErrorCategory::ProviderApiError));
    assert_eq!(result.details, Some(Value::String("tts down".to_string())));

    let agent_error = result.agent_error.unwrap();
    assert_eq!(agent_error["error_category"], "provider_api_error");
    assert_eq!(agent_error["details"]["status"], 404);
    assert_eq!(agent_error["details"]["attempts"].as_array().unwrap().len(), 3);

    let fallback_error = result.fallback_error.unwrap();
    assert_eq!(fallback_error["error_category"], "offline_fallback_error");
}

#[tokio::test]
async fn test_missing_voice_id_skips_synthesis_request() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = RelayConfig {
        voice_id: String::new(),
        ..test_config(&server, dir.path(), None)
    };
    let dispatcher = Dispatcher::new(&config).unwrap();

    let result = dispatcher.relay("hello").await;

    assert!(!result.success);
    assert_eq!(result.method, Some(Method::TextToSpeech));
    assert_eq!(result.error_category, Some(ErrorCategory::MissingVoiceId));
}

#[tokio::test]
async fn test_transport_failure_without_offline_synthesizer() {
    // Nothing listens on the discard port
    let dir = TempDir::new().unwrap();
    let config = RelayConfig {
        api_key: Some("test-key".to_string()),
        base_url: "http://127.0.0.1:9".to_string(),
        output_dir: dir.path().to_path_buf(),
        offline_command: None,
        ..RelayConfig::default()
    };
    let dispatcher = Dispatcher::new(&config).unwrap();

    let result = dispatcher.relay("hello").await;

    assert!(!result.success);
    assert_eq!(result.error_category, Some(ErrorCategory::TransportError));
    assert!(result.fallback_error.is_none());
}

#[tokio::test]
async fn test_chain_failure_reports_last_variant_and_every_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(AGENT_PATH))
        .and(body_partial_json(variant_one("hello")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "detail": "first" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(AGENT_PATH))
        .and(body_partial_json(variant_two("hello")))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({ "detail": "second" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(AGENT_PATH))
        .and(body_partial_json(variant_three("hello")))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({ "detail": "third" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TTS_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("tts down"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path(), Some("agent_1"));
    let dispatcher = Dispatcher::new(&config).unwrap();

    let result = dispatcher.relay("hello").await;

    assert!(!result.success);
    let details = &result.agent_error.unwrap()["details"];
    assert_eq!(details["status"], 503);
    assert_eq!(details["body"], json!({ "detail": "third" }));

    let attempts = details["attempts"].as_array().unwrap();
    let variants: Vec<&str> = attempts
        .iter()
        .map(|a| a["variant"].as_str().unwrap())
        .collect();
    assert_eq!(
        variants,
        ["simulation_messages", "simulated_user_messages", "root_messages"]
    );
    let statuses: Vec<u64> = attempts
        .iter()
        .map(|a| a["status"].as_u64().unwrap())
        .collect();
    assert_eq!(statuses, [400, 422, 503]);
    assert_eq!(attempts[0]["body"]["detail"], "first");
    assert_eq!(attempts[1]["body"]["detail"], "second");
}

#[tokio::test]
async fn test_transport_failure_moves_to_next_variant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(AGENT_PATH))
        .and(body_partial_json(variant_one("hello")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "response": "too late" }))
                .set_delay(Duration::from_secs(2)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(AGENT_PATH))
        .and(body_partial_json(variant_two("hello")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "on time" })))
        .expect(1)
        .mount(&server)
        .await;

    let http_client = reqwest::Client::new();
    let base_url = server.uri();
    let exchange = AgentClient::new(&http_client, &base_url, "test-key", "agent_1")
        .with_timeout(Duration::from_millis(200))
        .converse("hello")
        .await
        .unwrap();

    assert_eq!(exchange.variant, PayloadVariant::SimulatedUserMessages);
    assert_eq!(exchange.reply_text, "on time");
}

#[tokio::test]
async fn test_transport_failures_are_recorded_without_status() {
    let http_client = reqwest::Client::new();
    let err = AgentClient::new(&http_client, "http://127.0.0.1:9", "test-key", "agent_1")
        .with_timeout(Duration::from_millis(500))
        .converse("hello")
        .await
        .unwrap_err();

    match err {
        RelayError::AgentChainExhausted {
            status, attempts, ..
        } => {
            assert!(status.is_none());
            assert_eq!(attempts.len(), 3);
            assert!(attempts.iter().all(|a| a.status.is_none()));
            assert_eq!(attempts[2].variant, PayloadVariant::RootMessages);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
