pub mod relay_error;

pub use relay_error::{ErrorCategory, RelayError, RelayOutcome};
