// Copyright 2026 The Cadence Authors
// SPDX-License-Identifier: Apache-2.0

// Online segmentation of streamed model text
//
// Responsibilities:
// - Buffer raw text fragments as they arrive
// - Never split a fenced code block across segments
// - Release lines immediately, sentences too at the HEAVY humanizer degree
// - Force-cut plain text at the regular-safety limit
// - Abandon an unclosed fence at the code-safety limit
// - Hand back the remainder on flush, flagged if a fence is still open

mod segmenter;
mod sentence;
mod types;

pub use segmenter::Segmenter;
pub use sentence::SentenceRule;
pub use types::{CutReason, Segment, FENCE};
