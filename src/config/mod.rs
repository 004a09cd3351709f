//! Configuration module for the relay
//!
//! Configuration is assembled once at process start from an optional YAML
//! file and the environment (a `.env` file is loaded into the environment by
//! the binary beforehand). Priority: ENV vars > YAML > defaults.
//!
//! # Example
//! ```rust,no_run
//! use voice_relay::config::RelayConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = RelayConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config = RelayConfig::from_file(&PathBuf::from("relay.yaml"))?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

mod yaml;

pub use yaml::{ElevenLabsYaml, OfflineYaml, OutputYaml, YamlConfig};

use crate::core::elevenlabs::ELEVENLABS_API_URL;
use crate::core::stt::DEFAULT_STT_MODEL;
use crate::core::tts::{
    DEFAULT_OFFLINE_COMMAND, DEFAULT_OUTPUT_FORMAT, DEFAULT_TTS_MODEL, DEFAULT_VOICE_ID,
};
use crate::utils::{UrlValidationError, validate_base_url};

/// Default directory for generated audio
pub const DEFAULT_OUTPUT_DIR: &str = "temp_audio";

pub const ENV_API_KEY: &str = "ELEVENLABS_API_KEY";
pub const ENV_AGENT_ID: &str = "ELEVENLABS_AGENT_ID";
pub const ENV_VOICE_ID: &str = "ELEVENLABS_VOICE_ID";
pub const ENV_MODEL_ID: &str = "ELEVENLABS_MODEL_ID";
pub const ENV_OUTPUT_FORMAT: &str = "ELEVENLABS_OUTPUT_FORMAT";
pub const ENV_STT_MODEL_ID: &str = "ELEVENLABS_STT_MODEL_ID";
pub const ENV_BASE_URL: &str = "ELEVENLABS_BASE_URL";
pub const ENV_OUTPUT_DIR: &str = "VOICE_RELAY_OUTPUT_DIR";
pub const ENV_OFFLINE_COMMAND: &str = "VOICE_RELAY_OFFLINE_COMMAND";

/// Errors raised while assembling configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Invalid ElevenLabs base URL: {0}")]
    InvalidBaseUrl(#[from] UrlValidationError),
}

/// Integration mode, chosen once from which credentials are configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayMode<'a> {
    /// Agent id configured: message the agent first, synthesize on failure
    Agent { agent_id: &'a str },
    /// No agent id: synthesize directly
    TextToSpeech,
}

/// Relay configuration
///
/// Built once per process and passed by reference to every component.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// ElevenLabs API key; absent means every path fails before any request
    pub api_key: Option<String>,
    /// Conversational agent id; presence selects the agent path
    pub agent_id: Option<String>,
    pub voice_id: String,
    pub model_id: String,
    pub output_format: String,
    pub stt_model_id: String,
    /// Provider base URL, validated and without a trailing slash
    pub base_url: String,
    pub output_dir: PathBuf,
    /// Offline synthesizer command; `None` disables the offline fallback
    pub offline_command: Option<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            agent_id: None,
            voice_id: DEFAULT_VOICE_ID.to_string(),
            model_id: DEFAULT_TTS_MODEL.to_string(),
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            stt_model_id: DEFAULT_STT_MODEL.to_string(),
            base_url: ELEVENLABS_API_URL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            offline_command: Some(DEFAULT_OFFLINE_COMMAND.to_string()),
        }
    }
}

/// Treat unset and blank values the same way.
fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn read_yaml(path: &Path) -> Result<YamlConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    YamlConfig::parse(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl RelayConfig {
    /// Load configuration from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_sources(YamlConfig::default(), |key| std::env::var(key).ok())
    }

    /// Load configuration from a YAML file with environment variable overrides
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_sources(read_yaml(path)?, |key| std::env::var(key).ok())
    }

    /// Merge YAML values with a variable lookup; looked-up values win.
    pub fn from_sources<F>(yaml: YamlConfig, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let el = yaml.elevenlabs();
        let pick = |key: &str, yaml_value: Option<String>| {
            non_empty(lookup(key)).or_else(|| non_empty(yaml_value))
        };

        let base_url = pick(ENV_BASE_URL, el.base_url)
            .map(|url| validate_base_url(&url))
            .transpose()?
            .unwrap_or(defaults.base_url);

        let output_dir = non_empty(lookup(ENV_OUTPUT_DIR))
            .map(PathBuf::from)
            .or_else(|| yaml.output.as_ref().and_then(|o| o.dir.clone()))
            .unwrap_or(defaults.output_dir);

        // An explicitly empty command disables the fallback, so blank values
        // are not treated as unset here.
        let offline_command = lookup(ENV_OFFLINE_COMMAND)
            .or_else(|| yaml.offline.as_ref().and_then(|o| o.command.clone()))
            .map(|c| c.trim().to_string())
            .map_or(defaults.offline_command, |c| {
                if c.is_empty() { None } else { Some(c) }
            });

        Ok(Self {
            api_key: pick(ENV_API_KEY, el.api_key),
            agent_id: pick(ENV_AGENT_ID, el.agent_id),
            voice_id: pick(ENV_VOICE_ID, el.voice_id).unwrap_or(defaults.voice_id),
            model_id: pick(ENV_MODEL_ID, el.model_id).unwrap_or(defaults.model_id),
            output_format: pick(ENV_OUTPUT_FORMAT, el.output_format)
                .unwrap_or(defaults.output_format),
            stt_model_id: pick(ENV_STT_MODEL_ID, el.stt_model_id)
                .unwrap_or(defaults.stt_model_id),
            base_url,
            output_dir,
            offline_command,
        })
    }

    /// The integration mode implied by the configured credentials
    pub fn mode(&self) -> RelayMode<'_> {
        match self.agent_id.as_deref() {
            Some(agent_id) => RelayMode::Agent { agent_id },
            None => RelayMode::TextToSpeech,
        }
    }

    /// Builder-style helper for tests and embedding
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}
