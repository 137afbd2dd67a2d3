// Copyright 2026 The Cadence Authors
// SPDX-License-Identifier: Apache-2.0

// Segmenter
//
// Buffers raw model text and releases spans that are safe to send: complete
// fenced blocks, lines, sentences (HEAVY only), or force-cut slices once the
// buffer outgrows its safety limit. `feed` is a pure transition over the
// buffer and mode; no I/O happens here.

use super::sentence::SentenceRule;
use super::types::{CutReason, Segment, FENCE};
use crate::config::{HumanizerDegree, Thresholds};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Where the buffer stands with respect to code fences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// No open fence. The buffer holds plain text.
    Prose,
    /// The buffer starts with an opening fence whose closer has not arrived.
    /// `scanned` is the byte offset the closer search resumes from.
    Fenced { scanned: usize },
}

/// Outcome of one transition step.
enum Step {
    Cut(Segment),
    /// State changed without releasing text; run another step.
    Continue,
    /// Nothing more can be released until more text arrives.
    Wait,
}

/// Online segmentation state machine for one response.
#[derive(Debug, Clone)]
pub struct Segmenter {
    buffer: String,
    mode: Mode,
    thresholds: Thresholds,
    sentences: Option<SentenceRule>,
}

impl Segmenter {
    /// Create a segmenter. Sentence splitting is enabled only at
    /// `HumanizerDegree::Heavy`.
    pub fn new(thresholds: Thresholds, degree: HumanizerDegree) -> Self {
        Self {
            buffer: String::new(),
            mode: Mode::Prose,
            thresholds,
            sentences: degree.splits_sentences().then(SentenceRule::new),
        }
    }

    /// Whether the buffer is inside an unclosed code fence.
    pub fn inside_code_block(&self) -> bool {
        matches!(self.mode, Mode::Fenced { .. })
    }

    /// Text buffered but not yet released.
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// Append a fragment and return every segment it allows to be released,
    /// in order.
    pub fn feed(&mut self, fragment: &str) -> Vec<Segment> {
        self.buffer.push_str(fragment);

        let mut segments = Vec::new();
        loop {
            match self.step() {
                Step::Cut(segment) => segments.push(segment),
                Step::Continue => {}
                Step::Wait => break,
            }
        }
        segments
    }

    /// Release whatever remains, resetting the segmenter.
    ///
    /// The segment is flagged `incomplete` when a fence was still open.
    /// Returns `None` when nothing is buffered.
    pub fn flush(&mut self) -> Option<Segment> {
        let incomplete = self.inside_code_block();
        self.mode = Mode::Prose;
        if self.buffer.is_empty() {
            return None;
        }
        let text = std::mem::take(&mut self.buffer);
        Some(Segment {
            text,
            reason: CutReason::FinalFlush,
            incomplete,
        })
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    fn step(&mut self) -> Step {
        match self.mode {
            Mode::Fenced { scanned } => self.step_fenced(scanned),
            Mode::Prose => self.step_prose(),
        }
    }

    fn step_fenced(&mut self, scanned: usize) -> Step {
        let from = floor_char_boundary(&self.buffer, scanned.max(FENCE.len()));
        if let Some(pos) = self.buffer.get(from..).and_then(|rest| rest.find(FENCE)) {
            self.mode = Mode::Prose;
            return Step::Cut(self.cut(from + pos + FENCE.len(), CutReason::CodeBlockClosed));
        }

        if reaches(&self.buffer, self.thresholds.code_flush_chars) {
            self.mode = Mode::Prose;
            let end = self.buffer.len();
            return Step::Cut(self.cut(end, CutReason::OversizedCode));
        }

        // A closer may straddle the next fragment, so rescan the last two bytes.
        self.mode = Mode::Fenced {
            scanned: self.buffer.len().saturating_sub(FENCE.len() - 1),
        };
        Step::Wait
    }

    fn step_prose(&mut self) -> Step {
        if self.buffer.is_empty() {
            return Step::Wait;
        }

        match self.earliest_break() {
            Some(Break::Fence(0)) => {
                self.mode = Mode::Fenced { scanned: 0 };
                Step::Continue
            }
            Some(Break::Fence(pos)) => Step::Cut(self.cut(pos, CutReason::CodeBlockOpened)),
            Some(Break::Newline(pos)) => Step::Cut(self.cut(pos + 1, CutReason::Newline)),
            Some(Break::Sentence(end)) => Step::Cut(self.cut(end, CutReason::SentenceEnd)),
            None if reaches(&self.buffer, self.thresholds.regular_flush_chars) => {
                let end = self.force_cut_point();
                Step::Cut(self.cut(end, CutReason::OversizedRegular))
            }
            None => Step::Wait,
        }
    }

    /// Earliest break in the prose buffer. Ties go to the fence, then the
    /// newline, then the sentence end.
    fn earliest_break(&self) -> Option<Break> {
        let fence = self.buffer.find(FENCE).map(|p| (p, Break::Fence(p)));
        let newline = self.buffer.find('\n').map(|p| (p, Break::Newline(p)));
        let sentence = self
            .sentences
            .as_ref()
            .and_then(|rule| rule.find(&self.buffer))
            .map(|(start, end)| (start, Break::Sentence(end)));

        // `min_by_key` keeps the first of equal keys, so order is priority.
        [fence, newline, sentence]
            .into_iter()
            .flatten()
            .min_by_key(|(pos, _)| *pos)
            .map(|(_, brk)| brk)
    }

    /// Byte offset for an oversized plain cut: `regular_flush_chars` chars in,
    /// backed off any trailing backticks so a fence completed by the next
    /// fragment stays in one piece.
    fn force_cut_point(&self) -> usize {
        let limit = self.thresholds.regular_flush_chars;
        let end = self
            .buffer
            .char_indices()
            .nth(limit)
            .map(|(idx, _)| idx)
            .unwrap_or(self.buffer.len());
        let trimmed = self.buffer[..end].trim_end_matches('`').len();
        if trimmed == 0 {
            end
        } else {
            trimmed
        }
    }

    /// Split `buffer[..end]` off as a segment.
    fn cut(&mut self, end: usize, reason: CutReason) -> Segment {
        let rest = self.buffer.split_off(end);
        let text = std::mem::replace(&mut self.buffer, rest);
        Segment::new(text, reason)
    }
}

/// A candidate break in prose. Positions are byte offsets.
#[derive(Debug, Clone, Copy)]
enum Break {
    /// Opening fence starting at this offset.
    Fence(usize),
    /// Newline at this offset.
    Newline(usize),
    /// Sentence end finishing (exclusive) at this offset.
    Sentence(usize),
}

/// Whether `text` holds at least `limit` chars.
fn reaches(text: &str, limit: usize) -> bool {
    // Byte length bounds char count from above.
    text.len() >= limit && text.chars().count() >= limit
}

fn floor_char_boundary(text: &str, mut idx: usize) -> usize {
    if idx >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}
