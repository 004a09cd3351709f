//! Voice listing, used as the lightweight connectivity check.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde::de::IgnoredAny;
use tracing::debug;

use crate::core::elevenlabs::{API_KEY_HEADER, api_error, endpoint};
use crate::errors::{RelayError, RelayOutcome};

/// Timeout for the voice listing request
pub const VOICES_TIMEOUT: Duration = Duration::from_secs(30);

/// Only the length of `voices` matters; entries are never inspected.
#[derive(Debug, Deserialize)]
struct VoicesResponse {
    #[serde(default)]
    voices: Vec<IgnoredAny>,
}

/// Count the voices available to the configured account.
pub async fn count_voices(http_client: &Client, base_url: &str, api_key: &str) -> RelayOutcome<usize> {
    let response = http_client
        .get(endpoint(base_url, "/v1/voices"))
        .header(API_KEY_HEADER, api_key)
        .timeout(VOICES_TIMEOUT)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(api_error(response).await);
    }

    let listing: VoicesResponse = response
        .json()
        .await
        .map_err(|e| RelayError::InvalidResponse(e.to_string()))?;

    debug!("Provider reported {} voices", listing.voices.len());
    Ok(listing.voices.len())
}
