//! # Grid Aligner
//!
//! Converts one chord line + one lyric line into column-aligned segments.
//!
//! Column position is the unit of alignment (monospaced-column semantics),
//! not word position. The chord line's token start columns become cut points;
//! slicing both lines at the same boundaries guarantees each chord segment
//! renders directly above the lyric text occupying the same time span.
//!
//! Segment 0 is always the *prefix*: lyric text left of the first chord
//! column (empty when the first chord starts at column 0). It carries no
//! chord of its own; the carry resolver may attach it to the previous
//! block's final chord instead.

use serde::Serialize;

/// Column segmentation of a chord/lyric line pair.
///
/// Invariants: `lyric_segs.len() == chord_segs.len() == col_starts.len() + 1`;
/// boundary spans cover the full padded width.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignedSegmentation {
    /// Starting column of each chord token, in order.
    pub col_starts: Vec<usize>,
    /// Cut points: `[0, col_starts..., width]`.
    pub boundaries: Vec<usize>,
    /// Lyric text per boundary interval; index 0 is the prefix.
    pub lyric_segs: Vec<String>,
    /// Chord text per boundary interval, rebuilt on a blank canvas so each
    /// token sits at its recorded column.
    pub chord_segs: Vec<String>,
    /// Padded line width in characters.
    pub width: usize,
}

/// Align a chord line with a lyric line.
pub fn align(chords_raw: &str, lyrics_raw: &str) -> AlignedSegmentation {
    let chord_chars: Vec<char> = chords_raw.chars().collect();
    let lyric_chars: Vec<char> = lyrics_raw.chars().collect();

    // Locate each token as a maximal non-whitespace run. Scanning the line
    // directly resolves duplicate token text to distinct columns in order.
    let mut tokens: Vec<(usize, Vec<char>)> = Vec::new();
    let mut i = 0;
    while i < chord_chars.len() {
        if chord_chars[i].is_whitespace() {
            i += 1;
            continue;
        }
        let start = i;
        while i < chord_chars.len() && !chord_chars[i].is_whitespace() {
            i += 1;
        }
        tokens.push((start, chord_chars[start..i].to_vec()));
    }

    let col_starts: Vec<usize> = tokens.iter().map(|(start, _)| *start).collect();
    let first_col = col_starts.first().copied().unwrap_or(0);
    let width = chord_chars.len().max(lyric_chars.len()).max(first_col);

    let mut boundaries = Vec::with_capacity(col_starts.len() + 2);
    boundaries.push(0);
    boundaries.extend_from_slice(&col_starts);
    boundaries.push(width);

    // Lyric line right-padded to the full width, then sliced.
    let mut lyric_padded = lyric_chars;
    lyric_padded.resize(width, ' ');

    let lyric_segs: Vec<String> = boundaries
        .windows(2)
        .map(|w| lyric_padded[w[0]..w[1]].iter().collect())
        .collect();

    // Chord segments come off a rebuilt canvas, not the raw line, so every
    // token lands exactly at its recorded column. Writes past the width are
    // silently truncated.
    let mut canvas = vec![' '; width];
    for (start, text) in &tokens {
        for (j, ch) in text.iter().enumerate() {
            if start + j < width {
                canvas[start + j] = *ch;
            }
        }
    }

    let chord_segs: Vec<String> = boundaries
        .windows(2)
        .map(|w| canvas[w[0]..w[1]].iter().collect())
        .collect();

    AlignedSegmentation {
        col_starts,
        boundaries,
        lyric_segs,
        chord_segs,
        width,
    }
}

/// Blank `:DURATION` suffixes inside a chord segment with spaces of the same
/// width, preserving column alignment for display.
pub fn blank_duration_suffixes(segment: &str) -> String {
    let chars: Vec<char> = segment.chars().collect();
    let mut out = String::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == ':' {
            if let Some(len) = decimal_run_len(&chars[i + 1..]) {
                for _ in 0..len + 1 {
                    out.push(' ');
                }
                i += len + 1;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// Length of a leading `\d+(\.\d+)?` run, if any.
fn decimal_run_len(chars: &[char]) -> Option<usize> {
    let digits = chars.iter().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let rest = &chars[digits..];
    if rest.first() == Some(&'.') {
        let frac = rest[1..].iter().take_while(|c| c.is_ascii_digit()).count();
        if frac > 0 {
            return Some(digits + 1 + frac);
        }
    }
    Some(digits)
}
