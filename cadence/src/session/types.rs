// Copyright 2026 The Cadence Authors
// SPDX-License-Identifier: Apache-2.0

// Session outcome types
//
// Every session ends in exactly one `SessionOutcome`. A tool call is not an
// error: it hands control back to the caller with a `Continuation` carrying
// everything needed to build the follow-up request.

use std::time::Duration;

use crate::message::{ModelError, ModelPart, Role, ToolCall, Turn};

/// Terminal failure reasons.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("upstream blocked the response: {reason}")]
    UpstreamBlocked { reason: String },

    #[error("upstream stopped generation: {reason}")]
    UpstreamStopped { reason: String },

    #[error(transparent)]
    Transport(#[from] ModelError),
}

/// How a session ended. `sent` counts platform messages delivered by the
/// session, notices included.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// The stream ended naturally and everything buffered was delivered.
    Completed { sent: usize },
    /// The model requested a tool; the caller resumes with a new session.
    FunctionCall(Continuation),
    /// The upstream blocked, stopped, or failed.
    Error { error: SessionError, sent: usize },
    /// No fragment arrived within the inactivity timeout.
    Timeout { after: Duration, sent: usize },
}

impl SessionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionOutcome::Completed { .. } => "completed",
            SessionOutcome::FunctionCall(_) => "function_call",
            SessionOutcome::Error { .. } => "error",
            SessionOutcome::Timeout { .. } => "timeout",
        }
    }

    pub fn sent(&self) -> usize {
        match self {
            SessionOutcome::Completed { sent }
            | SessionOutcome::Error { sent, .. }
            | SessionOutcome::Timeout { sent, .. } => *sent,
            SessionOutcome::FunctionCall(c) => c.sent,
        }
    }
}

// ---------------------------------------------------------------------------
// Continuation (tool-call hand-off)
// ---------------------------------------------------------------------------

/// State handed to the caller when the model requests a tool.
#[derive(Debug, Clone, PartialEq)]
pub struct Continuation {
    pub call: ToolCall,
    /// Every text fragment seen this turn, in order, followed by the call.
    pub model_parts: Vec<ModelPart>,
    /// Messages already delivered before the interruption.
    pub sent: usize,
}

impl Continuation {
    /// Concatenated text the model produced before requesting the tool.
    pub fn accumulated_text(&self) -> String {
        self.model_parts
            .iter()
            .filter_map(|part| match part {
                ModelPart::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Prior turns for the follow-up request: the original context, a model
    /// turn holding the tool call, a tool turn holding its result, and the
    /// interrupted narration as a further model turn (omitted when empty).
    pub fn resume_history(&self, context: Vec<Turn>, tool_result: serde_json::Value) -> Vec<Turn> {
        let mut history = context;
        history.push(Turn::new(
            Role::Model,
            vec![ModelPart::ToolCall(self.call.clone())],
        ));
        history.push(Turn::new(
            Role::Tool,
            vec![ModelPart::ToolResult {
                name: self.call.name.clone(),
                result: tool_result,
            }],
        ));

        let narration = self.accumulated_text();
        if !narration.is_empty() {
            history.push(Turn::model_text(narration));
        }
        history
    }
}
