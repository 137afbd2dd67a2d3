// Copyright 2026 The Cadence Authors
// SPDX-License-Identifier: Apache-2.0

// Chunker
//
// Splits a finalized segment into pieces that fit the platform's message
// size. Segments never carry a partial fence, so splitting is purely
// length-driven.

/// Split `text` into pieces of at most `max_len` chars.
///
/// A piece that fits is returned verbatim. Longer text is cut after the last
/// whitespace in the back half of the window, or hard-cut at `max_len` when
/// there is none. Blank pieces are dropped, so blank input yields an empty
/// vector.
///
/// Chunking is idempotent: re-chunking any returned piece yields that piece.
pub fn chunk(text: &str, max_len: usize) -> Vec<String> {
    let max_len = max_len.max(1);
    let mut pieces = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let window_end = match rest.char_indices().nth(max_len) {
            Some((idx, _)) => idx,
            None => {
                push_non_blank(&mut pieces, rest);
                break;
            }
        };

        let cut = whitespace_cut(&rest[..window_end], max_len).unwrap_or(window_end);
        let (piece, tail) = rest.split_at(cut);
        push_non_blank(&mut pieces, piece);
        rest = tail;
    }

    pieces
}

/// Byte offset just past the last whitespace char at char position
/// `>= max_len / 2` in `window`.
fn whitespace_cut(window: &str, max_len: usize) -> Option<usize> {
    let min_pos = max_len / 2;
    window
        .char_indices()
        .enumerate()
        .filter(|(pos, (_, c))| *pos >= min_pos && c.is_whitespace())
        .last()
        .map(|(_, (idx, c))| idx + c.len_utf8())
}

fn push_non_blank(pieces: &mut Vec<String>, piece: &str) {
    if !piece.trim().is_empty() {
        pieces.push(piece.to_string());
    }
}
