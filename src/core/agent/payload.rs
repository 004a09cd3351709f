//! Request payload shapes for the agent simulate-conversation endpoint.
//!
//! The endpoint's request schema differs between API revisions, so the chain
//! walks a fixed, priority-ordered list of shapes instead of negotiating one.

use serde::Serialize;
use serde_json::{Value, json};

/// One candidate request body shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadVariant {
    /// `simulation_specification.messages`
    SimulationMessages,
    /// `simulation_specification.simulated_user_config.messages`
    SimulatedUserMessages,
    /// empty `simulated_user_config` with `messages` at the request root
    RootMessages,
}

impl PayloadVariant {
    /// Variants in the order they are attempted.
    pub const ALL: [PayloadVariant; 3] = [
        PayloadVariant::SimulationMessages,
        PayloadVariant::SimulatedUserMessages,
        PayloadVariant::RootMessages,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SimulationMessages => "simulation_messages",
            Self::SimulatedUserMessages => "simulated_user_messages",
            Self::RootMessages => "root_messages",
        }
    }

    /// Build the JSON body for `text`.
    pub fn build(&self, text: &str) -> Value {
        let messages = json!([user_turn(text)]);
        match self {
            Self::SimulationMessages => json!({
                "simulation_specification": {
                    "messages": messages,
                }
            }),
            Self::SimulatedUserMessages => json!({
                "simulation_specification": {
                    "simulated_user_config": {
                        "messages": messages,
                    }
                }
            }),
            Self::RootMessages => json!({
                "simulation_specification": {
                    "simulated_user_config": {}
                },
                "messages": messages,
            }),
        }
    }
}

fn user_turn(text: &str) -> Value {
    json!({
        "role": "user",
        "content": [
            { "type": "input_text", "text": text }
        ]
    })
}
