use chordscroll::{compile, parse, Player};

const SONG: &str = "\
---
title: Night Drive
artist: The Examples
bpm: 120
timeSig: 4/4
---
[chords]
C:2 G:2
[lyrics]
heyo nuuhu
[chords]
   Am F
[lyrics]
hy oh
";

#[test]
fn test_full_compile_pipeline() {
    let (song, events, carry) = compile(SONG);

    assert_eq!(song.metadata.title.as_deref(), Some("Night Drive"));
    assert_eq!(song.metadata.bpm, Some(120));
    assert_eq!(song.blocks.len(), 2);

    let names: Vec<&str> = events.iter().map(|e| e.chord_name.as_str()).collect();
    assert_eq!(names, vec!["C", "G", "Am", "F"]);
    assert_eq!(carry.len(), 1);
}

#[test]
fn test_events_are_gapless_and_ordered() {
    let (_, events, _) = compile(SONG);
    for pair in events.windows(2) {
        assert_eq!(pair[0].end_beat, pair[1].start_beat);
        assert!(pair[0].event_index < pair[1].event_index);
    }
    assert_eq!(events[0].start_beat, 0.0);
    assert_eq!(events.last().unwrap().end_beat, 12.0);
}

#[test]
fn test_segment_counts_match_per_block() {
    let song = parse(SONG);
    for block in &song.blocks {
        let n = block.aligned.chord_segs.len();
        assert_eq!(block.aligned.lyric_segs.len(), n);
        assert_eq!(block.aligned.boundaries.len(), n + 1);
        assert_eq!(n, block.tokens.len() + 1);
    }
}

#[test]
fn test_aligned_segments_reassemble_the_padded_lines() {
    let song = parse(SONG);
    for block in &song.blocks {
        let lyric: String = block.aligned.lyric_segs.concat();
        let chords: String = block.aligned.chord_segs.concat();
        assert_eq!(lyric.chars().count(), block.aligned.width);
        assert_eq!(chords.chars().count(), block.aligned.width);
        assert!(lyric.starts_with(block.lyrics_raw.trim_end()));
    }
}

#[test]
fn test_carry_window_matches_the_proportional_split() {
    let (_, _, carry) = compile(SONG);
    // "nuuhu" (5 chars) vs prefix "hy" (2 chars) over G's 2 beats
    let links = &carry[&1];
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].target_block_index, 1);
    assert!((links[0].start_offset_beats - 2.0 * 5.0 / 7.0).abs() < 1e-9);
    assert_eq!(links[0].end_offset_beats, 2.0);
}

#[test]
fn test_rebuild_from_the_same_source_is_identical() {
    let (song_a, events_a, carry_a) = compile(SONG);
    let (song_b, events_b, carry_b) = compile(SONG);
    assert_eq!(song_a, song_b);
    assert_eq!(events_a, events_b);
    assert_eq!(carry_a, carry_b);
}

#[test]
fn test_player_runs_the_song_end_to_end() {
    let mut player = Player::new(0.0);
    player.load_text(SONG, 0.0);
    player.start(0.0);

    // 120 bpm: 500ms per beat, 8-beat count-in ends at 4000ms.
    let counting = player.tick(1000.0).unwrap();
    assert!(counting.count_in_beats_left.is_some());
    assert!(counting.now_chord.is_none());

    let first = player.tick(4000.0).unwrap();
    assert_eq!(first.now_chord.as_deref(), Some("C"));
    assert_eq!(first.scroll_block, Some(0));

    let last = player.tick(4000.0 + 11.5 * 500.0).unwrap();
    assert_eq!(last.now_chord.as_deref(), Some("F"));
    assert_eq!(last.scroll_block, Some(1));
}

#[test]
fn test_tempo_change_does_not_jump_the_position() {
    let mut player = Player::new(0.0);
    player.load_text(SONG, 0.0);
    player.start(0.0);

    let before = player.tick(6000.0).unwrap().musical_beat;
    player.set_tempo(60, 6000.0);
    let after = player.tick(6000.0).unwrap().musical_beat;
    assert!((before - after).abs() < 1e-9);
    assert_eq!(player.bpm(), 60);
}

#[test]
fn test_malformed_front_matter_still_yields_blocks() {
    let src = "---\ntitle: [unclosed\n---\n[chords]\nC G\n";
    let song = parse(src);
    assert!(song.metadata.title.is_none());
    assert_eq!(song.blocks.len(), 1);
    assert_eq!(song.blocks[0].tokens.len(), 2);
}

#[test]
fn test_empty_source_is_a_valid_song() {
    let (song, events, carry) = compile("");
    assert!(song.blocks.is_empty());
    assert!(events.is_empty());
    assert!(carry.is_empty());
}
