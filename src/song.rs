//! # Song Data Model
//!
//! Types describing a parsed chord/lyric sheet:
//!
//! ```text
//! Song
//!  ├── Metadata (title, artist, time signature, capo, bpm)
//!  └── Vec<Block>
//!       ├── raw chord line + raw lyric line
//!       ├── Vec<ChordToken> (name + optional explicit beat duration)
//!       └── AlignedSegmentation (column-aligned segments, computed once)
//! ```
//!
//! A `Block` is immutable after construction. Its alignment is computed when
//! the block is built and cached on it; every block is rendered, so nothing
//! is gained by deferring the computation.

use crate::align::{self, AlignedSegmentation};
use crate::clock::{MAX_BPM, MIN_BPM};
use crate::parser;

/// Time signature (e.g., 4/4, 3/4, 6/8). The numerator drives bar length in
/// beats; the denominator is carried for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignature {
    pub numerator: u8,
    pub denominator: u8,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            numerator: 4,
            denominator: 4,
        }
    }
}

impl TimeSignature {
    /// Parse `"N/M"`. Whitespace around the slash is tolerated.
    /// Returns `None` for anything else; callers fall back to 4/4.
    pub fn parse(s: &str) -> Option<Self> {
        let (num, denom) = s.split_once('/')?;
        let numerator: u8 = num.trim().parse().ok()?;
        let denominator: u8 = denom.trim().parse().ok()?;
        if numerator == 0 || denominator == 0 {
            return None;
        }
        Some(Self {
            numerator,
            denominator,
        })
    }

    /// Beats per bar as used by the timeline (the numerator).
    pub fn beats_per_bar(&self) -> u32 {
        self.numerator as u32
    }
}

impl std::fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Song metadata from the front-matter block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub time_signature: TimeSignature,
    pub capo: Option<String>,
    /// BPM from front matter, clamped to `[MIN_BPM, MAX_BPM]`. Absent means
    /// the player keeps its current tempo (default 120).
    pub bpm: Option<u16>,
}

impl Metadata {
    /// One-line display summary: `title • artist • 4/4 • capo 2`.
    pub fn summary(&self) -> String {
        let mut bits: Vec<String> = Vec::new();
        if let Some(title) = &self.title {
            bits.push(title.clone());
        }
        if let Some(artist) = &self.artist {
            bits.push(artist.clone());
        }
        bits.push(self.time_signature.to_string());
        if let Some(capo) = &self.capo {
            bits.push(format!("capo {}", capo));
        }
        bits.join(" \u{2022} ")
    }
}

/// Raw front-matter fields, collected one at a time by the parser so a
/// malformed value drops only its own field.
#[derive(Debug, Default)]
pub struct RawMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub time_sig: Option<String>,
    /// Capo may be written as a bare number or a string.
    pub capo: Option<serde_yaml::Value>,
    pub bpm: Option<i64>,
}

impl RawMetadata {
    pub(crate) fn into_metadata(self) -> Metadata {
        let time_signature = self
            .time_sig
            .as_deref()
            .and_then(TimeSignature::parse)
            .unwrap_or_default();

        let capo = self.capo.and_then(|v| match v {
            serde_yaml::Value::String(s) => Some(s),
            serde_yaml::Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

        let bpm = self
            .bpm
            .map(|b| b.clamp(MIN_BPM as i64, MAX_BPM as i64) as u16);

        Metadata {
            title: self.title,
            artist: self.artist,
            time_signature,
            capo,
            bpm,
        }
    }
}

/// One chord token from a chord line: `G`, `Am7`, `C:2`, `F#m:1.5`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChordToken {
    pub name: String,
    /// Explicit duration in beats, if the token carried a `:DURATION` suffix.
    /// `None` means "one full bar" at timeline-build time.
    pub duration: Option<f64>,
}

/// One chord-line/lyric-line pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub chords_raw: String,
    pub lyrics_raw: String,
    pub tokens: Vec<ChordToken>,
    pub aligned: AlignedSegmentation,
}

impl Block {
    pub fn new(chords_raw: String, lyrics_raw: String) -> Self {
        let tokens = parser::tokenize_chords(&chords_raw);
        let aligned = align::align(&chords_raw, &lyrics_raw);
        Self {
            chords_raw,
            lyrics_raw,
            tokens,
            aligned,
        }
    }
}

/// A fully parsed song: metadata plus ordered blocks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Song {
    pub metadata: Metadata,
    pub blocks: Vec<Block>,
}

impl Song {
    /// Parse a song from source text. Never fails; see the parser module for
    /// the degradation rules.
    pub fn from_text(source: &str) -> Self {
        parser::parse(source)
    }
}
