// Copyright 2026 The Cadence Authors
// SPDX-License-Identifier: Apache-2.0

// Segment types
//
// A segment is a finalized span of model text that is safe to send as one
// unit. The cut reason records which rule released it.

use std::fmt;

/// Triple-backtick code fence delimiter.
pub const FENCE: &str = "```";

// ---------------------------------------------------------------------------
// Cut reasons
// ---------------------------------------------------------------------------

/// Why the segmenter released a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CutReason {
    /// Plain text preceding an opening fence.
    CodeBlockOpened,
    /// A complete fenced block, through its closing fence.
    CodeBlockClosed,
    /// Text through a newline.
    Newline,
    /// Text through a sentence end (HEAVY humanizer only).
    SentenceEnd,
    /// Plain text with no break that reached the regular-safety limit.
    OversizedRegular,
    /// An unclosed fence that reached the code-safety limit and was abandoned.
    OversizedCode,
    /// Whatever remained when the stream ended or was interrupted.
    FinalFlush,
}

impl CutReason {
    pub fn as_str(self) -> &'static str {
        match self {
            CutReason::CodeBlockOpened => "code_block_opened",
            CutReason::CodeBlockClosed => "code_block_closed",
            CutReason::Newline => "newline",
            CutReason::SentenceEnd => "sentence_end",
            CutReason::OversizedRegular => "oversized_regular",
            CutReason::OversizedCode => "oversized_code",
            CutReason::FinalFlush => "final_flush",
        }
    }
}

impl fmt::Display for CutReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Segment
// ---------------------------------------------------------------------------

/// An immutable finalized span, tagged with its cut reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub reason: CutReason,
    /// Set only on a final flush taken while a fence was still open.
    pub incomplete: bool,
}

impl Segment {
    pub fn new(text: impl Into<String>, reason: CutReason) -> Self {
        Self {
            text: text.into(),
            reason,
            incomplete: false,
        }
    }

    /// Whether the segment carries fenced code, complete or not.
    pub fn is_code(&self) -> bool {
        matches!(
            self.reason,
            CutReason::CodeBlockClosed | CutReason::OversizedCode
        ) || self.text.contains(FENCE)
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
