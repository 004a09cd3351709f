//! Local, non-network speech synthesis used when every remote path fails.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::errors::{RelayError, RelayOutcome};

/// Default offline synthesizer command
pub const DEFAULT_OFFLINE_COMMAND: &str = "espeak-ng";

/// Synthesize text to an audio file, or fail.
#[async_trait]
pub trait OfflineSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, path: &Path) -> RelayOutcome<()>;

    fn name(&self) -> &str;
}

/// Runs an espeak-compatible command as `<program> -w <path> <text>`.
#[derive(Debug, Clone)]
pub struct CommandSynthesizer {
    program: String,
}

impl CommandSynthesizer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for CommandSynthesizer {
    fn default() -> Self {
        Self::new(DEFAULT_OFFLINE_COMMAND)
    }
}

#[async_trait]
impl OfflineSynthesizer for CommandSynthesizer {
    async fn synthesize(&self, text: &str, path: &Path) -> RelayOutcome<()> {
        debug!("Offline synthesis via {}: {}", self.program, text);

        let output = Command::new(&self.program)
            .arg("-w")
            .arg(path)
            .arg(text)
            .output()
            .await
            .map_err(|e| RelayError::Offline(format!("failed to run {}: {e}", self.program)))?;

        if !output.status.success() {
            return Err(RelayError::Offline(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.len() > 0 => Ok(()),
            Ok(_) => Err(RelayError::Offline(format!(
                "{} produced an empty file",
                self.program
            ))),
            Err(e) => Err(RelayError::Offline(format!(
                "{} did not produce {}: {e}",
                self.program,
                path.display()
            ))),
        }
    }

    fn name(&self) -> &str {
        &self.program
    }
}
