//! # Carry Resolver
//!
//! Cross-line carry: when a block's lyric has text *before* its first chord
//! column, that prefix belongs musically to the tail of the previous block's
//! last chord. This pass links each such prefix to the previous block's
//! final event and computes where inside that event the prefix starts
//! filling:
//!
//! - Previous last-chord lyric non-empty ("nuuhu" then "hy"): split the
//!   event's duration proportionally by trimmed character counts, so the
//!   previous text and the carried prefix share display time by length.
//! - Previous last-chord lyric blank: half silence, half carry; the prefix
//!   starts at mid-chord.
//!
//! The carry always ends exactly at the chord's end. The map is built once
//! from immutable block/event data and rebuilt wholesale on reload. A single
//! source event may hold several links; they all apply independently during
//! playback.

use std::collections::HashMap;

use serde::Serialize;

use crate::song::Block;
use crate::timeline::Event;

/// Link from a source event to a following block's prefix segment
/// (structurally: segment 0 of the target block).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarryLink {
    pub source_event_index: usize,
    pub target_block_index: usize,
    /// Offset inside the source event where the carried prefix starts
    /// filling, in `[0, dur]`.
    pub start_offset_beats: f64,
    /// Always the source event's duration.
    pub end_offset_beats: f64,
}

/// Carry links keyed by source event index.
pub type CarryMap = HashMap<usize, Vec<CarryLink>>;

/// Build the carry map for a song's blocks and events.
pub fn build_carry_map(blocks: &[Block], events: &[Event]) -> CarryMap {
    let mut map = CarryMap::new();
    if events.is_empty() {
        return map;
    }

    // Last event index per block; later events overwrite earlier ones.
    let mut last_event_by_block: HashMap<usize, usize> = HashMap::new();
    for ev in events {
        last_event_by_block.insert(ev.block_index, ev.event_index);
    }

    for (block_index, block) in blocks.iter().enumerate().skip(1) {
        // No "lyrics before first chord" situation.
        let first_col = block.aligned.col_starts.first().copied().unwrap_or(0);
        if first_col == 0 {
            continue;
        }

        let prefix_len = match block.aligned.lyric_segs.first() {
            Some(seg) => seg.trim().chars().count(),
            None => 0,
        };
        if prefix_len == 0 {
            continue;
        }

        let Some(&source_event_index) = last_event_by_block.get(&(block_index - 1)) else {
            continue;
        };
        let source = &events[source_event_index];

        // Lyric segment under the previous block's final chord: prefix sits
        // at 0, so chord k maps to segment k + 1.
        let prev_block = &blocks[block_index - 1];
        let last_seg_index = prev_block.tokens.len().saturating_sub(1) + 1;
        let prev_len = prev_block
            .aligned
            .lyric_segs
            .get(last_seg_index)
            .map(|seg| seg.trim().chars().count())
            .unwrap_or(0);

        let dur = source.dur;
        let start_offset_beats = if prev_len > 0 {
            // Proportional split: the carried prefix starts once the
            // previous text's share of the chord has elapsed.
            let total = (prev_len + prefix_len).max(1);
            dur * prev_len as f64 / total as f64
        } else {
            // Silence under the final chord: half silence, half carry.
            dur * 0.5
        };

        map.entry(source_event_index).or_default().push(CarryLink {
            source_event_index,
            target_block_index: block_index,
            start_offset_beats,
            end_offset_beats: dur,
        });
    }

    map
}
