use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use voice_relay::output::{emit, fatal_record};
use voice_relay::{
    Dispatcher, RelayConfig, RelayError, RelayResult, TranscriptionRecord, VoiceCheck,
};

/// Voice Relay - forwards text or audio to ElevenLabs and prints one JSON result
///
/// Help is available as `voice-relay help`; `-h` and `--version` are relayed
/// like any other text.
#[derive(Parser, Debug)]
#[command(name = "voice-relay")]
#[command(version, about, long_about = None)]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Text to send to the agent (or synthesize); may start with `-`
    #[arg(allow_hyphen_values = true)]
    text: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check connectivity by counting the account's voices
    Test,

    /// Transcribe an audio file
    Transcribe {
        /// Audio file to upload
        file: PathBuf,
    },

    /// Transcribe an audio file and relay the transcript
    Converse {
        /// Audio file to upload
        file: PathBuf,
    },
}

/// What a single invocation does once arguments are parsed
#[derive(Debug)]
enum Request {
    Relay(String),
    Test,
    Transcribe(PathBuf),
    Converse(PathBuf),
}

impl Cli {
    fn into_request(self) -> Option<(Option<PathBuf>, Request)> {
        let request = match (self.command, self.text) {
            (Some(Commands::Test), _) => Request::Test,
            (Some(Commands::Transcribe { file }), _) => Request::Transcribe(file),
            (Some(Commands::Converse { file }), _) => Request::Converse(file),
            (None, Some(text)) if !text.trim().is_empty() => Request::Relay(text),
            (None, _) => return None,
        };
        Some((self.config, request))
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<RelayConfig, RelayError> {
    let config = match path {
        Some(path) => RelayConfig::from_file(path)?,
        None => RelayConfig::from_env()?,
    };
    Ok(config)
}

/// Failure record in the shape the request's command normally prints.
fn failure_record(request: &Request, error: &RelayError) -> serde_json::Result<Value> {
    match request {
        Request::Test => serde_json::to_value(VoiceCheck::failure(error)),
        Request::Transcribe(_) => serde_json::to_value(TranscriptionRecord::failure(error)),
        Request::Relay(_) | Request::Converse(_) => {
            serde_json::to_value(RelayResult::failure(None, error))
        }
    }
}

/// Run one request to completion and return its record.
async fn run(config_path: Option<PathBuf>, request: Request) -> anyhow::Result<Value> {
    let config = match load_config(config_path.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return Ok(failure_record(&request, &e)?);
        }
    };

    let dispatcher = match Dispatcher::new(&config) {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            error!("Failed to initialize: {}", e);
            return Ok(failure_record(&request, &e)?);
        }
    };

    let record = match request {
        Request::Relay(text) => serde_json::to_value(dispatcher.relay(&text).await)?,
        Request::Test => serde_json::to_value(dispatcher.check_voices().await)?,
        Request::Transcribe(file) => serde_json::to_value(dispatcher.transcribe(&file).await)?,
        Request::Converse(file) => serde_json::to_value(dispatcher.converse_audio(&file).await)?,
    };
    Ok(record)
}

/// Print the last-resort record and report failure.
fn fatal(error: &str, details: &str) -> ExitCode {
    let line = fatal_record(error, details);
    let _ = writeln!(std::io::stdout(), "{line}");
    ExitCode::FAILURE
}

fn print_record<T: Serialize>(record: &T) -> ExitCode {
    match emit(record) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Failed to write result: {}", e);
            fatal("Failed to write result", &e.to_string())
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env file if it exists (must be done before config loading)
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            warn!("Invalid arguments: {}", e.kind());
            return print_record(&RelayResult::usage_error());
        }
    };

    let Some((config_path, request)) = cli.into_request() else {
        return print_record(&RelayResult::usage_error());
    };

    let mut task = tokio::spawn(run(config_path, request));

    tokio::select! {
        joined = &mut task => match joined {
            Ok(Ok(record)) => print_record(&record),
            Ok(Err(e)) => {
                error!("Failed to build result: {:?}", e);
                fatal("Failed to build result", &e.to_string())
            }
            Err(e) if e.is_panic() => {
                let message = panic_message(e.into_panic());
                error!("Pipeline panicked: {}", message);
                fatal("Fatal error", &message)
            }
            Err(e) => fatal("Fatal error", &e.to_string()),
        },
        _ = tokio::signal::ctrl_c() => {
            task.abort();
            warn!("Interrupted");
            fatal("Interrupted", "received Ctrl-C")
        }
    }
}
