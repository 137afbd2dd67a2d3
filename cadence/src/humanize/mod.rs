// Copyright 2026 The Cadence Authors
// SPDX-License-Identifier: Apache-2.0

// Text transforms applied by the HEAVY humanizer
//
// A transform is a pure string rewrite applied to each prose chunk right
// before it is sent. Chunks carrying fenced code never reach a transform.

use unicode_normalization::UnicodeNormalization;

// ---------------------------------------------------------------------------
// Trait: TextTransform
// ---------------------------------------------------------------------------

/// Pure chunk rewrite. Implementations must be Send + Sync so one instance
/// can be shared by every session.
pub trait TextTransform: Send + Sync {
    /// Rewrite a single chunk. Must be idempotent:
    /// `transform(transform(x)) == transform(x)`.
    fn transform(&self, input: &str) -> String;
}

/// Leaves text untouched.
pub struct IdentityTransform;

impl TextTransform for IdentityTransform {
    fn transform(&self, input: &str) -> String {
        input.to_string()
    }
}

// ---------------------------------------------------------------------------
// Implementation: CasualTransform
// ---------------------------------------------------------------------------

/// Makes a chunk read like a quick chat message:
///
/// 1. NFC unicode normalization
/// 2. Zero-width / invisible character removal
/// 3. Trailing whitespace trimmed and a single closing period dropped
/// 4. The opening word lowercased when it is an ordinary capitalized word
///
/// A chunk that would become blank is returned unchanged.
pub struct CasualTransform;

impl CasualTransform {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CasualTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl TextTransform for CasualTransform {
    fn transform(&self, input: &str) -> String {
        let nfc: String = input.nfc().collect();
        let visible = remove_invisible_chars(&nfc);
        let trimmed = drop_closing_period(visible.trim_end());
        let casual = lowercase_opening_word(trimmed);

        if casual.trim().is_empty() {
            input.to_string()
        } else {
            casual
        }
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Returns true for zero-width or invisible characters that only add noise
/// to a chat message. Joiners and variation selectors are kept because
/// emoji sequences depend on them.
fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{200B}' // Zero-width space
        | '\u{FEFF}' // BOM / zero-width no-break space
        | '\u{00AD}' // Soft hyphen
        | '\u{200E}' // Left-to-right mark
        | '\u{200F}' // Right-to-left mark
        | '\u{202A}'..='\u{202E}' // Bidi embeddings and overrides
        | '\u{2060}'..='\u{2064}' // Word joiner and invisible operators
        | '\u{180E}' // Mongolian vowel separator
    )
}

fn remove_invisible_chars(input: &str) -> String {
    input.chars().filter(|c| !is_invisible(*c)).collect()
}

/// "Sounds good." -> "Sounds good", but "Wait..." stays.
fn drop_closing_period(input: &str) -> &str {
    match input.strip_suffix('.') {
        Some(rest) if !rest.ends_with('.') => rest,
        _ => input,
    }
}

/// "Sure thing" -> "sure thing". Leaves "I", "I'm", acronyms ("API") and
/// mixed-case words ("GitHub") alone.
fn lowercase_opening_word(input: &str) -> String {
    let word_len = input
        .find(|c: char| c.is_whitespace())
        .unwrap_or(input.len());
    let word = &input[..word_len];

    let mut chars = word.chars();
    let first = match chars.next() {
        Some(c) if c.is_uppercase() => c,
        _ => return input.to_string(),
    };
    let rest = chars.as_str();
    let is_ordinary = !rest.is_empty()
        && !rest.starts_with('\'')
        && !rest.starts_with('\u{2019}')
        && rest.chars().all(|c| !c.is_uppercase())
        && rest.chars().any(|c| c.is_lowercase());
    if !is_ordinary {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    out.extend(first.to_lowercase());
    out.push_str(&input[first.len_utf8()..]);
    out
}
