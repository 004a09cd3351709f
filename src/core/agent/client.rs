//! Agent simulate-conversation client.
//!
//! Sends each [`PayloadVariant`] in order and stops at the first response
//! with a status below 400. The accepted variant's body is the only one the
//! reply text is derived from.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::messages::{AgentExchange, VariantAttempt, extract_audio, extract_reply_text};
use super::payload::PayloadVariant;
use crate::core::elevenlabs::{API_KEY_HEADER, body_to_value, endpoint};
use crate::errors::{RelayError, RelayOutcome};

/// Per-variant request timeout
pub const AGENT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for one configured agent.
pub struct AgentClient<'a> {
    http_client: &'a Client,
    base_url: &'a str,
    api_key: &'a str,
    agent_id: &'a str,
    timeout: Duration,
}

impl<'a> AgentClient<'a> {
    pub fn new(http_client: &'a Client, base_url: &'a str, api_key: &'a str, agent_id: &'a str) -> Self {
        Self {
            http_client,
            base_url,
            api_key,
            agent_id,
            timeout: AGENT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn url(&self) -> String {
        endpoint(
            self.base_url,
            &format!("/v1/convai/agents/{}/simulate-conversation", self.agent_id),
        )
    }

    /// Run the fallback chain for `text`.
    ///
    /// On total failure the error carries the last variant's status and body,
    /// plus the full list of attempts.
    pub async fn converse(&self, text: &str) -> RelayOutcome<AgentExchange> {
        let url = self.url();
        let mut attempts = Vec::with_capacity(PayloadVariant::ALL.len());

        for variant in PayloadVariant::ALL {
            debug!("Sending agent payload variant {}", variant.as_str());
            let attempt = self.send_variant(&url, variant, text).await;

            match attempt.status {
                Some(status) if status < 400 => {
                    info!(
                        "Agent accepted payload variant {} (status {})",
                        variant.as_str(),
                        status
                    );
                    let reply_text = extract_reply_text(&attempt.body);
                    let audio = extract_audio(&attempt.body);
                    return Ok(AgentExchange {
                        variant,
                        reply_text,
                        raw: attempt.body,
                        audio,
                    });
                }
                Some(status) => {
                    warn!(
                        "Agent rejected payload variant {} with status {}",
                        variant.as_str(),
                        status
                    );
                }
                None => {
                    warn!(
                        "Agent payload variant {} failed without a response: {}",
                        variant.as_str(),
                        attempt.body
                    );
                }
            }
            attempts.push(attempt);
        }

        let (status, body) = attempts
            .last()
            .map(|last| (last.status, last.body.clone()))
            .unwrap_or((None, Value::Null));

        Err(RelayError::AgentChainExhausted {
            status,
            body,
            attempts,
        })
    }

    async fn send_variant(&self, url: &str, variant: PayloadVariant, text: &str) -> VariantAttempt {
        let result = self
            .http_client
            .post(url)
            .header(API_KEY_HEADER, self.api_key)
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(&variant.build(text))
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                return VariantAttempt {
                    variant,
                    status: None,
                    body: Value::String(RelayError::from(e).to_string()),
                };
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(text) => body_to_value(&text),
            Err(e) => Value::String(format!("Failed to read response: {e}")),
        };

        VariantAttempt {
            variant,
            status: Some(status),
            body,
        }
    }
}
