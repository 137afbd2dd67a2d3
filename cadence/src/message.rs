// Copyright 2026 The Cadence Authors
// SPDX-License-Identifier: Apache-2.0

// Model-side message types.
//
// A `Fragment` is one item pulled from the model stream. `Turn` is the
// provider-neutral conversation entry the caller replays when resuming
// after a tool call.

use serde::{Deserialize, Serialize};

/// A tool call requested by the model mid-stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    /// Parsed JSON arguments (not a raw string).
    #[serde(default)]
    pub args: serde_json::Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, args: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// One incremental item from the model stream.
///
/// Delivered in generation order, with at most one terminal signal
/// (`Blocked`, `Stopped` or `ToolCall`) per turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fragment {
    /// Generated text.
    Text(String),
    /// The provider refused to continue for safety reasons.
    Blocked { reason: String },
    /// Generation halted abnormally (recitation, length, provider stop).
    Stopped { reason: String },
    /// The model wants a tool executed before it continues.
    ToolCall(ToolCall),
}

impl Fragment {
    pub fn text(s: impl Into<String>) -> Self {
        Fragment::Text(s.into())
    }
}

/// Failure of the model stream itself (connection reset, malformed frame).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("model stream failed: {0}")]
pub struct ModelError(pub String);

// ---------------------------------------------------------------------------
// Conversation turns (resume contract)
// ---------------------------------------------------------------------------

/// The role of a conversation participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
    Tool,
}

/// One part of a turn's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelPart {
    Text(String),
    ToolCall(ToolCall),
    ToolResult {
        name: String,
        result: serde_json::Value,
    },
}

/// A single prior turn handed back to the model client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub parts: Vec<ModelPart>,
}

impl Turn {
    pub fn new(role: Role, parts: Vec<ModelPart>) -> Self {
        Self { role, parts }
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![ModelPart::Text(text.into())])
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self::new(Role::Model, vec![ModelPart::Text(text.into())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_deserializes_from_tagged_json() {
        let f: Fragment = serde_json::from_str(r#"{"text":"hello"}"#).unwrap();
        assert_eq!(f, Fragment::text("hello"));

        let f: Fragment =
            serde_json::from_str(r#"{"tool_call":{"name":"search","args":{"q":"rust"}}}"#)
                .unwrap();
        assert_eq!(
            f,
            Fragment::ToolCall(ToolCall::new("search", serde_json::json!({"q": "rust"})))
        );

        let f: Fragment = serde_json::from_str(r#"{"blocked":{"reason":"SAFETY"}}"#).unwrap();
        assert_eq!(
            f,
            Fragment::Blocked {
                reason: "SAFETY".to_string()
            }
        );
    }

    #[test]
    fn tool_call_args_default_to_null() {
        let f: Fragment = serde_json::from_str(r#"{"tool_call":{"name":"now"}}"#).unwrap();
        match f {
            Fragment::ToolCall(call) => assert!(call.args.is_null()),
            other => panic!("expected tool call, got {other:?}"),
        }
    }
}
