pub mod config;
pub mod core;
pub mod dispatcher;
pub mod errors;
pub mod output;
pub mod utils;

// Re-export commonly used items for convenience
pub use config::{RelayConfig, RelayMode};
pub use dispatcher::Dispatcher;
pub use errors::{ErrorCategory, RelayError, RelayOutcome};
pub use output::{Method, RelayResult, TranscriptionRecord, VoiceCheck};
