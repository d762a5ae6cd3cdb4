//! # Timeline Builder
//!
//! Walks all blocks' chord tokens in order and assigns each a contiguous
//! `[start_beat, end_beat)` interval on a single beat counter spanning the
//! whole song. A token without an explicit duration takes one full bar.
//!
//! Events are immutable once built and are rebuilt wholesale on reload.
//! Adjacent events are gapless: `events[i].end_beat == events[i+1].start_beat`
//! across block boundaries too.

use serde::Serialize;

use crate::song::Block;

/// One scheduled chord occurrence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Unique index in parse order.
    pub event_index: usize,
    pub block_index: usize,
    pub chord_index_in_block: usize,
    pub chord_name: String,
    pub start_beat: f64,
    pub end_beat: f64,
    /// `floor(start_beat / bar_beats)`.
    pub bar_index: usize,
    /// Effective duration in beats. Zero is degenerate but accepted.
    pub dur: f64,
}

/// Build the flat event list for a song.
pub fn build_events(blocks: &[Block], bar_beats: f64) -> Vec<Event> {
    let mut events = Vec::new();
    let mut beat = 0.0_f64;
    let mut event_index = 0;

    for (block_index, block) in blocks.iter().enumerate() {
        for (chord_index_in_block, token) in block.tokens.iter().enumerate() {
            let dur = token.duration.unwrap_or(bar_beats);
            let start_beat = beat;
            let end_beat = start_beat + dur;

            events.push(Event {
                event_index,
                block_index,
                chord_index_in_block,
                chord_name: token.name.clone(),
                start_beat,
                end_beat,
                bar_index: (start_beat / bar_beats).floor() as usize,
                dur,
            });

            beat = end_beat;
            event_index += 1;
        }
    }

    events
}

/// Maximal contiguous run of events sharing `events[idx]`'s bar index,
/// scanned in both directions. Returns the inclusive `(start, end)` range.
pub fn bar_group(events: &[Event], idx: usize) -> (usize, usize) {
    let Some(ev) = events.get(idx) else {
        return (idx, idx);
    };
    let bar = ev.bar_index;

    let mut a = idx;
    while a > 0 && events[a - 1].bar_index == bar {
        a -= 1;
    }
    let mut b = idx;
    while b + 1 < events.len() && events[b + 1].bar_index == bar {
        b += 1;
    }
    (a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::song::Block;

    fn block(chords: &str, lyrics: &str) -> Block {
        Block::new(chords.to_string(), lyrics.to_string())
    }

    #[test]
    fn test_explicit_durations_share_a_bar() {
        // Two half-bar chords at bar length 4 both land in bar 0.
        let blocks = vec![block("C:2 G:2", "")];
        let events = build_events(&blocks, 4.0);
        assert_eq!(events.len(), 2);
        assert_eq!((events[0].start_beat, events[0].end_beat), (0.0, 2.0));
        assert_eq!((events[1].start_beat, events[1].end_beat), (2.0, 4.0));
        assert_eq!(events[0].bar_index, 0);
        assert_eq!(events[1].bar_index, 0);
        assert_eq!(bar_group(&events, 0), (0, 1));
        assert_eq!(bar_group(&events, 1), (0, 1));
    }

    #[test]
    fn test_default_duration_is_one_bar() {
        let blocks = vec![block("C G", "")];
        let events = build_events(&blocks, 3.0);
        assert_eq!(events[0].dur, 3.0);
        assert_eq!(events[1].start_beat, 3.0);
        assert_eq!(events[1].bar_index, 1);
    }

    #[test]
    fn test_time_is_continuous_across_blocks() {
        let blocks = vec![block("C:2", ""), block("G:2 Am", "")];
        let events = build_events(&blocks, 4.0);
        assert_eq!(events.len(), 3);
        for pair in events.windows(2) {
            assert_eq!(pair[0].end_beat, pair[1].start_beat);
        }
        assert_eq!(events[1].block_index, 1);
        assert_eq!(events[1].start_beat, 2.0);
    }

    #[test]
    fn test_zero_duration_event_is_accepted() {
        let blocks = vec![block("C:0 G:4", "")];
        let events = build_events(&blocks, 4.0);
        assert_eq!(events[0].start_beat, events[0].end_beat);
        assert_eq!(events[1].start_beat, 0.0);
    }

    #[test]
    fn test_blocks_without_tokens_contribute_no_events() {
        let blocks = vec![block("", "only words"), block("C", "")];
        let events = build_events(&blocks, 4.0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].block_index, 1);
        assert_eq!(events[0].start_beat, 0.0);
    }

    #[test]
    fn test_bar_group_bounded_by_bar_change() {
        // C:2 G:2 | Am: bar 0 holds the first two, bar 1 the third.
        let blocks = vec![block("C:2 G:2 Am", "")];
        let events = build_events(&blocks, 4.0);
        assert_eq!(bar_group(&events, 2), (2, 2));
        assert_eq!(bar_group(&events, 1), (0, 1));
    }
}
