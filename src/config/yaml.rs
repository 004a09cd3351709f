use serde::Deserialize;
use std::path::PathBuf;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Environment
/// variables override any values specified here.
///
/// # Example YAML structure
/// ```yaml
/// elevenlabs:
///   api_key: "your-elevenlabs-key"
///   agent_id: "agent_123"
///   voice_id: "21m00Tcm4TlvDq8ikWAM"
///   model_id: "eleven_multilingual_v2"
///   output_format: "mp3_44100_128"
///   stt_model_id: "scribe_v1"
///   base_url: "https://api.elevenlabs.io"
///
/// output:
///   dir: "temp_audio"
///
/// offline:
///   command: "espeak-ng"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub elevenlabs: Option<ElevenLabsYaml>,
    pub output: Option<OutputYaml>,
    pub offline: Option<OfflineYaml>,
}

/// Provider configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ElevenLabsYaml {
    pub api_key: Option<String>,
    pub agent_id: Option<String>,
    pub voice_id: Option<String>,
    pub model_id: Option<String>,
    pub output_format: Option<String>,
    pub stt_model_id: Option<String>,
    pub base_url: Option<String>,
}

/// Audio output configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct OutputYaml {
    pub dir: Option<PathBuf>,
}

/// Offline synthesizer configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct OfflineYaml {
    /// Command to run; an empty string disables the offline fallback
    pub command: Option<String>,
}

impl YamlConfig {
    /// Parse YAML text
    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    pub(crate) fn elevenlabs(&self) -> ElevenLabsYaml {
        self.elevenlabs.clone().unwrap_or_default()
    }
}
