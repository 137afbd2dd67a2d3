// Copyright 2026 The Cadence Authors
// SPDX-License-Identifier: Apache-2.0

// Sentence-end detection for HEAVY humanizing.
//
// A sentence ends at a `.` followed by whitespace, unless the period closes a
// known abbreviation or follows a digit, or at an ideographic full stop `。`
// (no lookahead needed). A period at the end of the buffer is not a sentence
// end yet: the next fragment may extend it into an ellipsis or a token, and
// the final flush releases it otherwise.

use regex::Regex;

/// Lowercased abbreviations whose trailing period is not a sentence end.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "mt", "vs", "etc", "e.g", "i.e", "approx",
    "inc", "ltd", "co", "corp", "no", "fig", "cf", "al", "jan", "feb", "mar", "apr", "jun", "jul",
    "aug", "sep", "sept", "oct", "nov", "dec",
];

/// Finds sentence ends in a prose buffer.
#[derive(Debug, Clone)]
pub struct SentenceRule {
    candidate: Regex,
}

impl SentenceRule {
    pub fn new() -> Self {
        // Our own pattern; it compiles or the build is broken.
        let candidate =
            Regex::new(r"\.\s|。").expect("sentence candidate pattern is invalid");
        Self { candidate }
    }

    /// Byte range `(start, end)` of the earliest sentence end in `text`.
    ///
    /// `end` is exclusive and covers the period plus the whitespace char
    /// after it, so the next segment does not open with that space.
    pub fn find(&self, text: &str) -> Option<(usize, usize)> {
        self.candidate
            .find_iter(text)
            .find(|m| m.as_str().starts_with('。') || closes_sentence(&text[..m.start()]))
            .map(|m| (m.start(), m.end()))
    }
}

impl Default for SentenceRule {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a period placed right after `before` ends a sentence.
fn closes_sentence(before: &str) -> bool {
    let last = match before.chars().next_back() {
        Some(c) => c,
        None => return false,
    };
    if last.is_ascii_digit() || last.is_whitespace() {
        return false;
    }

    let word_start = before
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map(|(idx, c)| idx + c.len_utf8())
        .unwrap_or(0);
    let word = before[word_start..]
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();

    !ABBREVIATIONS.contains(&word.as_str())
}
