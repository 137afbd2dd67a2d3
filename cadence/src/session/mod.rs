// Copyright 2026 The Cadence Authors
// SPDX-License-Identifier: Apache-2.0

// Stream session
//
// Responsibilities:
// - Pull model fragments one at a time, racing each pull against the
//   inactivity watchdog
// - Feed text to the segmenter and deliver every released segment through
//   the chunker and pacer before pulling again
// - Discard the buffer on a block/stop signal
// - Flush the buffer on a tool call and hand back a continuation
// - Flush on natural end, with a placeholder if nothing was ever sent
// - Send one best-effort notice on error and timeout outcomes

mod types;

pub use types::{Continuation, SessionError, SessionOutcome};

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_stream::{Stream, StreamExt};
use uuid::Uuid;

use crate::chunk::chunk;
use crate::config::{validate_config, ConfigError, DeliveryConfig};
use crate::humanize::{CasualTransform, TextTransform};
use crate::message::{Fragment, ModelError, ModelPart, ToolCall};
use crate::pacer::Pacer;
use crate::segment::{CutReason, Segment, Segmenter};
use crate::sink::{ChannelId, MessageId, MessageSink};

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// Injected collaborators, shared across sessions.
#[derive(Clone)]
pub struct SessionDeps {
    pub sink: Arc<dyn MessageSink>,
    pub transform: Arc<dyn TextTransform>,
}

impl SessionDeps {
    /// Deps with the default `CasualTransform`.
    pub fn new(sink: Arc<dyn MessageSink>) -> Self {
        Self {
            sink,
            transform: Arc::new(CasualTransform::new()),
        }
    }
}

/// Where a session posts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTarget {
    pub channel: ChannelId,
    /// The message that triggered the response. The first chunk replies to it.
    pub reply_to: Option<MessageId>,
}

impl SessionTarget {
    pub fn channel(channel: ChannelId) -> Self {
        Self {
            channel,
            reply_to: None,
        }
    }

    pub fn reply(channel: ChannelId, trigger: MessageId) -> Self {
        Self {
            channel,
            reply_to: Some(trigger),
        }
    }
}

// ---------------------------------------------------------------------------
// StreamSession
// ---------------------------------------------------------------------------

/// Drives one generation request from first fragment to terminal outcome.
///
/// Sessions share nothing mutable, so any number can run concurrently.
pub struct StreamSession {
    session_id: String,
    config: DeliveryConfig,
    channel: ChannelId,
    segmenter: Segmenter,
    pacer: Pacer,
    model_parts: Vec<ModelPart>,
    started_at: Instant,
    last_activity_at: Instant,
    fragments: usize,
}

impl StreamSession {
    /// Create a session. Fails when the config is invalid or the sink's
    /// message limit is below `max_message_len`.
    pub fn new(
        config: DeliveryConfig,
        deps: SessionDeps,
        target: SessionTarget,
    ) -> Result<Self, ConfigError> {
        validate_config(&config)?;
        let sink_limit = deps.sink.max_message_len();
        if sink_limit < config.max_message_len {
            return Err(ConfigError::Validation(format!(
                "max_message_len ({}) exceeds the sink limit ({sink_limit})",
                config.max_message_len
            )));
        }

        let session_id = Uuid::new_v4().to_string();
        let pacer = Pacer::new(
            session_id.clone(),
            &config,
            deps.sink,
            deps.transform,
            target.channel.clone(),
            target.reply_to,
        );
        let now = Instant::now();

        Ok(Self {
            session_id,
            segmenter: Segmenter::new(config.thresholds, config.degree),
            channel: target.channel,
            config,
            pacer,
            model_parts: Vec::new(),
            started_at: now,
            last_activity_at: now,
            fragments: 0,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Consume the model stream until a terminal outcome.
    pub async fn run<S>(mut self, mut stream: S) -> SessionOutcome
    where
        S: Stream<Item = Result<Fragment, ModelError>> + Unpin + Send,
    {
        tracing::info!(
            session_id = %self.session_id,
            channel = %self.channel,
            config_hash = %self.config.config_hash,
            degree = %self.config.degree,
            "session started"
        );

        let outcome = loop {
            let fragment =
                match tokio::time::timeout(self.config.inactivity_timeout, stream.next()).await {
                    Ok(Some(Ok(fragment))) => fragment,
                    Ok(Some(Err(e))) => break self.fail(SessionError::Transport(e)).await,
                    Ok(None) => break self.complete().await,
                    Err(_) => break self.time_out().await,
                };

            self.last_activity_at = Instant::now();
            self.fragments += 1;

            match fragment {
                Fragment::Text(text) => self.on_text(text).await,
                Fragment::Blocked { reason } => {
                    break self.fail(SessionError::UpstreamBlocked { reason }).await
                }
                Fragment::Stopped { reason } => {
                    break self.fail(SessionError::UpstreamStopped { reason }).await
                }
                Fragment::ToolCall(call) => break self.interrupt(call).await,
            }
        };

        tracing::info!(
            session_id = %self.session_id,
            channel = %self.channel,
            outcome = outcome.as_str(),
            sent = outcome.sent(),
            fragments = self.fragments,
            elapsed_ms = self.started_at.elapsed().as_millis() as u64,
            "session finished"
        );
        outcome
    }

    // -----------------------------------------------------------------------
    // Fragment handling
    // -----------------------------------------------------------------------

    async fn on_text(&mut self, text: String) {
        let segments = self.segmenter.feed(&text);
        self.model_parts.push(ModelPart::Text(text));

        for segment in segments {
            if segment.reason == CutReason::OversizedCode {
                tracing::warn!(
                    session_id = %self.session_id,
                    channel = %self.channel,
                    segment_len = segment.char_len(),
                    "unclosed code fence abandoned at safety limit"
                );
            }
            self.dispatch(segment).await;
        }
    }

    /// Chunk a segment and send it, in full, before returning.
    async fn dispatch(&mut self, segment: Segment) {
        let chunks = chunk(&segment.text, self.config.max_message_len);
        tracing::debug!(
            session_id = %self.session_id,
            reason = %segment.reason,
            segment_len = segment.char_len(),
            chunks = chunks.len(),
            "segment released"
        );
        if chunks.is_empty() {
            return;
        }
        self.pacer.deliver(&segment, &chunks).await;
    }

    /// Flush the segmenter and deliver the remainder, if any.
    async fn flush(&mut self) {
        if let Some(segment) = self.segmenter.flush() {
            if segment.incomplete {
                tracing::warn!(
                    session_id = %self.session_id,
                    channel = %self.channel,
                    segment_len = segment.char_len(),
                    "flushing with an unclosed code fence"
                );
            }
            self.dispatch(segment).await;
        }
    }

    // -----------------------------------------------------------------------
    // Terminal transitions
    // -----------------------------------------------------------------------

    async fn complete(&mut self) -> SessionOutcome {
        self.flush().await;

        if self.pacer.sent_count() == 0 {
            tracing::info!(
                session_id = %self.session_id,
                channel = %self.channel,
                "response produced no message, sending placeholder"
            );
            if let Some(text) = self.config.notices.empty_response.clone() {
                self.pacer.send_notice(&text).await;
            }
        }

        SessionOutcome::Completed {
            sent: self.pacer.sent_count(),
        }
    }

    async fn interrupt(&mut self, call: ToolCall) -> SessionOutcome {
        tracing::info!(
            session_id = %self.session_id,
            channel = %self.channel,
            tool = %call.name,
            pending_len = self.segmenter.pending().chars().count(),
            "tool call requested, flushing buffer"
        );
        self.flush().await;
        self.model_parts.push(ModelPart::ToolCall(call.clone()));

        SessionOutcome::FunctionCall(Continuation {
            call,
            model_parts: std::mem::take(&mut self.model_parts),
            sent: self.pacer.sent_count(),
        })
    }

    async fn fail(&mut self, error: SessionError) -> SessionOutcome {
        let discarded = self.segmenter.pending().chars().count();
        let notice = match &error {
            SessionError::UpstreamBlocked { .. } => {
                tracing::warn!(
                    session_id = %self.session_id,
                    channel = %self.channel,
                    error = %error,
                    discarded,
                    "response blocked upstream"
                );
                self.config.notices.blocked.clone()
            }
            SessionError::UpstreamStopped { .. } => {
                tracing::warn!(
                    session_id = %self.session_id,
                    channel = %self.channel,
                    error = %error,
                    discarded,
                    "response stopped upstream"
                );
                self.config.notices.stopped.clone()
            }
            SessionError::Transport(_) => {
                tracing::error!(
                    session_id = %self.session_id,
                    channel = %self.channel,
                    error = %error,
                    fragments = self.fragments,
                    "model stream failed"
                );
                self.config.notices.transport.clone()
            }
        };

        if let Some(text) = notice {
            self.pacer.send_notice(&text).await;
        }

        SessionOutcome::Error {
            error,
            sent: self.pacer.sent_count(),
        }
    }

    async fn time_out(&mut self) -> SessionOutcome {
        let after: Duration = self.last_activity_at.elapsed();
        tracing::warn!(
            session_id = %self.session_id,
            channel = %self.channel,
            idle_ms = after.as_millis() as u64,
            timeout_ms = self.config.inactivity_timeout.as_millis() as u64,
            fragments = self.fragments,
            "model stream inactive, abandoning response"
        );

        if let Some(text) = self.config.notices.timeout.clone() {
            self.pacer.send_notice(&text).await;
        }

        SessionOutcome::Timeout {
            after: self.config.inactivity_timeout,
            sent: self.pacer.sent_count(),
        }
    }
}
