// Copyright 2026 The Cadence Authors
// SPDX-License-Identifier: Apache-2.0

// Pacer
//
// Turns the chunks of one segment into timed sink operations. NONE and
// LIGHT send back-to-back with a typing pulse before each chunk. MEDIUM and
// HEAVY simulate typing time per chunk and pause between chunks, sometimes
// with a longer "thinking" pause. HEAVY also rewrites prose chunks through a
// `TextTransform`.
//
// The pacer owns the session's reply latch: the first chunk successfully
// sent while a trigger message exists goes out as a reply, everything after
// is a plain send.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{DeliveryConfig, HumanizerDegree, PacingConfig};
use crate::humanize::TextTransform;
use crate::segment::{Segment, FENCE};
use crate::sink::{ChannelId, MessageId, MessageSink, SendOptions};

// ---------------------------------------------------------------------------
// Plan types
// ---------------------------------------------------------------------------

/// What happens before a chunk is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Typing {
    /// Send immediately.
    Skip,
    /// Pulse the typing indicator, then send.
    Pulse,
    /// Pulse the typing indicator and wait this long before sending.
    Simulate(Duration),
}

/// A wait after a chunk, before the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pause {
    pub duration: Duration,
    /// A thinking pause re-pulses typing halfway through.
    pub thinking: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedChunk {
    /// Text as it will be sent, after any transform.
    pub text: String,
    pub typing: Typing,
    pub pause_after: Option<Pause>,
}

/// The timed send sequence for one segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PacingPlan {
    pub chunks: Vec<PlannedChunk>,
}

/// Counts for one `deliver` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub sent: usize,
    pub failed: usize,
}

// ---------------------------------------------------------------------------
// Pacer
// ---------------------------------------------------------------------------

/// Sends paced chunks for one session.
pub struct Pacer {
    session_id: String,
    degree: HumanizerDegree,
    pacing: PacingConfig,
    sink: Arc<dyn MessageSink>,
    transform: Arc<dyn TextTransform>,
    channel: ChannelId,
    reply_target: Option<MessageId>,
    replied: bool,
    sent_count: usize,
    planned_segments: usize,
    rng: StdRng,
}

impl Pacer {
    pub fn new(
        session_id: impl Into<String>,
        config: &DeliveryConfig,
        sink: Arc<dyn MessageSink>,
        transform: Arc<dyn TextTransform>,
        channel: ChannelId,
        reply_target: Option<MessageId>,
    ) -> Self {
        let rng = match config.pacing.jitter_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => {
                let mut thread = rand::rng();
                StdRng::from_rng(&mut thread)
            }
        };
        Self {
            session_id: session_id.into(),
            degree: config.degree,
            pacing: config.pacing.clone(),
            sink,
            transform,
            channel,
            reply_target,
            replied: false,
            sent_count: 0,
            planned_segments: 0,
            rng,
        }
    }

    /// Platform messages successfully sent so far, notices included.
    pub fn sent_count(&self) -> usize {
        self.sent_count
    }

    /// Whether the reply latch has flipped.
    pub fn has_replied(&self) -> bool {
        self.replied
    }

    /// Build the timed send sequence for a segment's chunks.
    ///
    /// Advances the pacer's RNG and its count of planned segments, so plans
    /// must be built in delivery order.
    pub fn plan(&mut self, segment: &Segment, chunks: &[String]) -> PacingPlan {
        if chunks.is_empty() {
            return PacingPlan::default();
        }
        let first_segment = self.planned_segments == 0;
        self.planned_segments += 1;

        let last = chunks.len() - 1;
        let planned = chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| {
                let is_code = segment.is_code() || chunk.contains(FENCE);
                let text = if self.degree.transforms_text() && !is_code {
                    self.transform.transform(chunk)
                } else {
                    chunk.clone()
                };

                let typing = if !self.degree.simulates_typing() {
                    Typing::Pulse
                } else if first_segment && i == 0 {
                    Typing::Skip
                } else {
                    Typing::Simulate(self.typing_delay(&text, is_code))
                };

                let pause_after = if self.degree.simulates_typing() && i < last {
                    Some(self.random_pause())
                } else {
                    None
                };

                PlannedChunk {
                    text,
                    typing,
                    pause_after,
                }
            })
            .collect();

        PacingPlan { chunks: planned }
    }

    /// Plan and send a segment's chunks, awaiting every sink call in order.
    ///
    /// A failed send is logged and skipped; the remaining chunks still go out.
    pub async fn deliver(&mut self, segment: &Segment, chunks: &[String]) -> DeliveryReport {
        let plan = self.plan(segment, chunks);
        let mut report = DeliveryReport::default();

        for step in plan.chunks {
            match step.typing {
                Typing::Skip => {}
                Typing::Pulse => self.pulse_typing().await,
                Typing::Simulate(wait) => {
                    self.pulse_typing().await;
                    tokio::time::sleep(wait).await;
                }
            }

            if self.send_chunk(&step.text, segment).await {
                report.sent += 1;
            } else {
                report.failed += 1;
            }

            if let Some(pause) = step.pause_after {
                self.pause(pause).await;
            }
        }

        report
    }

    /// Best-effort user notice: a reply to the trigger when the latch still
    /// allows one, otherwise (or if the reply fails) a plain channel post.
    pub async fn send_notice(&mut self, text: &str) -> bool {
        if let Some(target) = self.reply_target.clone().filter(|_| !self.replied) {
            match self
                .sink
                .send(&self.channel, text, SendOptions::reply_to(target))
                .await
            {
                Ok(_) => {
                    self.replied = true;
                    self.sent_count += 1;
                    return true;
                }
                Err(e) => {
                    tracing::warn!(
                        session_id = %self.session_id,
                        channel = %self.channel,
                        error = %e,
                        "notice reply failed, falling back to channel post"
                    );
                }
            }
        }

        match self
            .sink
            .send(&self.channel, text, SendOptions::default())
            .await
        {
            Ok(_) => {
                self.sent_count += 1;
                true
            }
            Err(e) => {
                tracing::warn!(
                    session_id = %self.session_id,
                    channel = %self.channel,
                    error = %e,
                    "notice could not be delivered"
                );
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    async fn send_chunk(&mut self, text: &str, segment: &Segment) -> bool {
        let options = match &self.reply_target {
            Some(target) if !self.replied => SendOptions::reply_to(target.clone()),
            _ => SendOptions::default(),
        };
        let as_reply = options.reply_to.is_some();

        match self.sink.send(&self.channel, text, options).await {
            Ok(message_id) => {
                self.sent_count += 1;
                if as_reply {
                    self.replied = true;
                }
                tracing::debug!(
                    session_id = %self.session_id,
                    channel = %self.channel,
                    message_id = %message_id,
                    reason = %segment.reason,
                    chunk_len = text.chars().count(),
                    as_reply,
                    "chunk sent"
                );
                true
            }
            Err(e) => {
                tracing::warn!(
                    session_id = %self.session_id,
                    channel = %self.channel,
                    reason = %segment.reason,
                    chunk_len = text.chars().count(),
                    as_reply,
                    error = %e,
                    "chunk send failed"
                );
                false
            }
        }
    }

    async fn pulse_typing(&self) {
        if let Err(e) = self.sink.send_typing(&self.channel).await {
            tracing::debug!(
                session_id = %self.session_id,
                channel = %self.channel,
                error = %e,
                "typing pulse failed"
            );
        }
    }

    async fn pause(&self, pause: Pause) {
        if pause.thinking {
            let half = pause.duration / 2;
            tokio::time::sleep(half).await;
            self.pulse_typing().await;
            tokio::time::sleep(pause.duration - half).await;
        } else {
            tokio::time::sleep(pause.duration).await;
        }
    }

    /// `min(len * per_char_ms, max_typing_ms)`, raised to the minimum
    /// visible duration for the chunk kind.
    fn typing_delay(&self, text: &str, is_code: bool) -> Duration {
        let p = &self.pacing;
        let len = text.chars().count() as u64;
        let typed = len.saturating_mul(p.per_char_ms).min(p.max_typing_ms);
        let floor = if is_code {
            p.min_code_visible_ms
        } else {
            p.min_visible_ms
        };
        Duration::from_millis(typed.max(floor))
    }

    fn random_pause(&mut self) -> Pause {
        let p = &self.pacing;
        let thinking = p.thinking_probability > 0.0 && self.rng.random_bool(p.thinking_probability);
        let (lo, hi) = if thinking {
            (p.thinking_min_ms, p.thinking_max_ms)
        } else {
            (p.pause_min_ms, p.pause_max_ms)
        };
        Pause {
            duration: Duration::from_millis(self.rng.random_range(lo..=hi)),
            thinking,
        }
    }
}
