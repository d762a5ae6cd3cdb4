//! Playback output type definitions
//!
//! Everything the engine hands to its collaborators is plain serializable
//! data addressed by structural indices (block index + segment index). The
//! rendering collaborator resolves indices to its own display handles; the
//! audio collaborator consumes [`BeatTick`] values. The engine holds no
//! rendering references of any kind.

use serde::Serialize;

/// Structural address of one rendered segment. Segment 0 is the block's
/// prefix; chord token `k` maps to segment `k + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentRef {
    pub block: usize,
    pub segment: usize,
}

/// An active lyric segment with its karaoke fill progress in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentFill {
    pub block: usize,
    pub segment: usize,
    pub fill: f64,
}

/// One metronome beat crossing. `beat_in_bar` counts `1..=bar_beats`;
/// the downbeat (1) is the accent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BeatTick {
    pub beat_in_bar: u32,
    pub accent: bool,
}

/// Per-tick output of the playback driver.
///
/// During count-in (`musical_beat < 0`) the highlight vectors are empty,
/// `now_chord` is `None` and `count_in_beats_left` reports the whole beats
/// remaining. Beat ticks fire during count-in too.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub musical_beat: f64,
    /// Chord segments of the current bar group, highlighted together.
    pub chord_segments: Vec<SegmentRef>,
    /// Lyric segments with fill fractions: one per bar-group event plus one
    /// per carry link resolved this tick (the target block's prefix).
    pub lyric_fills: Vec<SegmentFill>,
    /// Blocks marked "current", sorted and deduplicated.
    pub current_blocks: Vec<usize>,
    /// Chord name of the pointer event; `None` during count-in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub now_chord: Option<String>,
    /// Block to scroll into view: the pointer event's own block only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll_block: Option<usize>,
    /// Set on the tick that crosses an integer beat boundary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beat: Option<BeatTick>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count_in_beats_left: Option<u32>,
}

/// One block prepared for display: chord segments with duration suffixes
/// blanked, lyric segments verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderBlock {
    pub chord_segments: Vec<String>,
    pub lyric_segments: Vec<String>,
    /// False when the raw lyric line was empty; the renderer may skip the
    /// lyric row entirely.
    pub has_lyrics: bool,
}

/// The full renderer-facing model of a loaded song.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderModel {
    pub meta_line: String,
    pub blocks: Vec<RenderBlock>,
}
