// Copyright 2026 The Cadence Authors
// SPDX-License-Identifier: Apache-2.0

// Chat platform sink
//
// The engine never talks to a platform directly. Callers inject a
// `MessageSink` that performs typing pulses and message sends; tests use
// recording doubles.

use std::fmt;

/// Identifies the channel (or DM) a session posts into.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelId(pub String);

impl ChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies a platform message, e.g. the user message that triggered a
/// response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-send options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// Send as a reply to this message.
    pub reply_to: Option<MessageId>,
}

impl SendOptions {
    pub fn reply_to(id: MessageId) -> Self {
        Self { reply_to: Some(id) }
    }
}

/// Errors a sink reports for a single operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SinkError {
    #[error("send rejected by platform: {0}")]
    Rejected(String),

    #[error("platform unavailable: {0}")]
    Unavailable(String),

    #[error("message of {len} chars exceeds platform limit of {limit}")]
    TooLong { len: usize, limit: usize },
}

// ---------------------------------------------------------------------------
// Trait: MessageSink (dependency injection point)
// ---------------------------------------------------------------------------

/// Abstraction over the chat platform client.
///
/// Implementations must be Send + Sync so they can be shared across
/// concurrent sessions via `Arc`. A slow send should simply take longer;
/// the engine awaits every call before issuing the next one.
#[async_trait::async_trait]
pub trait MessageSink: Send + Sync {
    /// Show a "typing" indicator in the channel.
    async fn send_typing(&self, channel: &ChannelId) -> Result<(), SinkError>;

    /// Post a message, returning the platform id of the sent message.
    async fn send(
        &self,
        channel: &ChannelId,
        text: &str,
        options: SendOptions,
    ) -> Result<MessageId, SinkError>;

    /// Largest message, in chars, the platform accepts.
    fn max_message_len(&self) -> usize;
}
