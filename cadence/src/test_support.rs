// Copyright 2026 The Cadence Authors
// SPDX-License-Identifier: Apache-2.0

// Test doubles shared by unit tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

use crate::sink::{ChannelId, MessageId, MessageSink, SendOptions, SinkError};

/// One recorded sink call. `at` is measured from sink creation on the tokio
/// clock, so paused-time tests see virtual durations.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    Typing {
        at: Duration,
    },
    Send {
        text: String,
        reply_to: Option<MessageId>,
        at: Duration,
        ok: bool,
    },
}

impl SinkCall {
    pub fn at(&self) -> Duration {
        match self {
            SinkCall::Typing { at } | SinkCall::Send { at, .. } => *at,
        }
    }

    pub fn reply_to(&self) -> Option<MessageId> {
        match self {
            SinkCall::Send { reply_to, .. } => reply_to.clone(),
            SinkCall::Typing { .. } => None,
        }
    }
}

/// A sink that records every call in order.
pub struct RecordingSink {
    calls: Mutex<Vec<SinkCall>>,
    start: Instant,
    max_len: usize,
    send_attempts: AtomicUsize,
    failing_sends: HashSet<usize>,
    failing_typing: bool,
    send_delay: Option<Duration>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            start: Instant::now(),
            max_len: 2000,
            send_attempts: AtomicUsize::new(0),
            failing_sends: HashSet::new(),
            failing_typing: false,
            send_delay: None,
        }
    }

    /// Fail the send attempts with these zero-based indexes.
    pub fn failing_sends(mut self, attempts: &[usize]) -> Self {
        self.failing_sends = attempts.iter().copied().collect();
        self
    }

    pub fn failing_typing(mut self) -> Self {
        self.failing_typing = true;
        self
    }

    pub fn with_send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = Some(delay);
        self
    }

    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Every send attempt, failed ones included.
    pub fn sends(&self) -> Vec<SinkCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, SinkCall::Send { .. }))
            .collect()
    }

    /// Texts of successful sends, in order.
    pub fn sent_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SinkCall::Send { text, ok: true, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    fn elapsed(&self) -> Duration {
        Instant::now().duration_since(self.start)
    }
}

#[async_trait::async_trait]
impl MessageSink for RecordingSink {
    async fn send_typing(&self, _channel: &ChannelId) -> Result<(), SinkError> {
        self.calls
            .lock()
            .unwrap()
            .push(SinkCall::Typing { at: self.elapsed() });
        if self.failing_typing {
            return Err(SinkError::Unavailable("typing disabled".to_string()));
        }
        Ok(())
    }

    async fn send(
        &self,
        _channel: &ChannelId,
        text: &str,
        options: SendOptions,
    ) -> Result<MessageId, SinkError> {
        if let Some(delay) = self.send_delay {
            tokio::time::sleep(delay).await;
        }
        let attempt = self.send_attempts.fetch_add(1, Ordering::SeqCst);
        let ok = !self.failing_sends.contains(&attempt);
        self.calls.lock().unwrap().push(SinkCall::Send {
            text: text.to_string(),
            reply_to: options.reply_to,
            at: self.elapsed(),
            ok,
        });
        if ok {
            Ok(MessageId::new(format!("m{attempt}")))
        } else {
            Err(SinkError::Rejected(format!("attempt {attempt} rejected")))
        }
    }

    fn max_message_len(&self) -> usize {
        self.max_len
    }
}
