//! Playback driver
//!
//! [`Player`] owns the whole engine state (song, event timeline, carry map,
//! clock, transport and pointer) as a single value. Loading a song replaces
//! the derived state wholesale, so no tick can observe a half-rebuilt
//! timeline. Transport commands are synchronous mutations safe to interleave
//! between ticks; the host's scheduler re-arms the tick loop while
//! [`Transport::Running`], and cancellation is simply not re-arming.
//!
//! Each tick:
//! 1. Samples the musical beat (global beat minus count-in).
//! 2. During count-in, emits an empty frame with the count-in remainder.
//! 3. Otherwise advances the event pointer monotonically (never regressing,
//!    clamped to the last event), highlights the pointer's whole bar group,
//!    computes per-segment fill fractions, resolves carry links, and picks
//!    the scroll target.
//! 4. Detects integer beat-boundary crossings and emits a [`BeatTick`] for
//!    the metronome collaborator.

use std::fs;
use std::path::Path;

use crate::align;
use crate::carry::{self, CarryMap};
use crate::clock::{Clock, DEFAULT_BPM};
use crate::error::{Result, ScrollError};
use crate::song::Song;
use crate::timeline::{self, Event};

use super::types::{BeatTick, Frame, RenderBlock, RenderModel, SegmentFill, SegmentRef};

/// Guard against zero-width spans when computing fill fractions.
const MIN_SPAN: f64 = 1e-6;

/// Bars of count-in before musical beat zero.
pub const DEFAULT_COUNT_IN_BARS: u32 = 2;

/// Default bpm step for relative tempo adjustment.
pub const DEFAULT_TEMPO_STEP: u16 = 2;

/// Scheduling state. The host re-arms ticks only while `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Stopped,
    Running,
}

/// Playback session: one explicit value holding all mutable engine state.
#[derive(Debug, Clone)]
pub struct Player {
    song: Option<Song>,
    events: Vec<Event>,
    carry: CarryMap,
    clock: Clock,
    bar_beats: u32,
    count_in_bars: u32,
    tempo_step: u16,
    transport: Transport,
    current_event_index: usize,
    last_beat_index: i64,
}

impl Player {
    pub fn new(now_ms: f64) -> Self {
        Self {
            song: None,
            events: Vec::new(),
            carry: CarryMap::new(),
            clock: Clock::new(DEFAULT_BPM, now_ms),
            bar_beats: 4,
            count_in_bars: DEFAULT_COUNT_IN_BARS,
            tempo_step: DEFAULT_TEMPO_STEP,
            transport: Transport::Stopped,
            current_event_index: 0,
            last_beat_index: -1,
        }
    }

    /// Parse `text` and replace the session's song, timeline and carry map.
    /// Front-matter bpm (if present) retunes the clock; otherwise the
    /// current tempo is kept. Playback is left stopped and rewound.
    pub fn load_text(&mut self, text: &str, now_ms: f64) {
        let song = Song::from_text(text);

        self.bar_beats = song.metadata.time_signature.beats_per_bar();
        if let Some(bpm) = song.metadata.bpm {
            self.clock = Clock::new(bpm, now_ms);
        }
        self.events = timeline::build_events(&song.blocks, self.bar_beats as f64);
        self.carry = carry::build_carry_map(&song.blocks, &self.events);
        self.song = Some(song);

        self.transport = Transport::Stopped;
        self.clock.restart(now_ms);
        self.current_event_index = 0;
        self.last_beat_index = -1;
    }

    /// Load a song from a file. On failure the previously loaded song (and
    /// all playback state) is left untouched.
    pub fn load_path<P: AsRef<Path>>(&mut self, path: P, now_ms: f64) -> Result<()> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ScrollError::Load {
            path: path.display().to_string(),
            source,
        })?;
        self.load_text(&text, now_ms);
        Ok(())
    }

    pub fn song(&self) -> Option<&Song> {
        self.song.as_ref()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn carry_map(&self) -> &CarryMap {
        &self.carry
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    pub fn is_running(&self) -> bool {
        self.transport == Transport::Running
    }

    pub fn bpm(&self) -> u16 {
        self.clock.bpm()
    }

    pub fn bar_beats(&self) -> u32 {
        self.bar_beats
    }

    fn count_in_beats(&self) -> f64 {
        (self.count_in_bars * self.bar_beats) as f64
    }

    /// Musical beat at `now_ms`: negative during count-in.
    pub fn musical_beat_at(&self, now_ms: f64) -> f64 {
        self.clock.global_beat_at(now_ms) - self.count_in_beats()
    }

    /// Begin playback from the top (count-in included). A no-op while
    /// already running (the state machine never arms a second loop) and
    /// without a loaded song.
    pub fn start(&mut self, now_ms: f64) {
        if self.is_running() || self.song.is_none() {
            return;
        }
        self.clock.restart(now_ms);
        self.current_event_index = 0;
        self.last_beat_index = -1;
        self.transport = Transport::Running;
    }

    /// Stop scheduling further ticks. Position state is retained.
    pub fn pause(&mut self) {
        self.transport = Transport::Stopped;
    }

    /// Stop and rewind pointer, clock and metronome.
    pub fn reset(&mut self, now_ms: f64) {
        self.transport = Transport::Stopped;
        self.clock.restart(now_ms);
        self.current_event_index = 0;
        self.last_beat_index = -1;
    }

    /// Set an absolute tempo, preserving beat continuity.
    pub fn set_tempo(&mut self, bpm: u16, now_ms: f64) {
        self.clock.set_tempo(bpm, now_ms);
    }

    /// Nudge the tempo by `steps` increments of the tempo step.
    pub fn adjust_tempo(&mut self, steps: i32, now_ms: f64) {
        let delta = steps * self.tempo_step as i32;
        let target = (self.clock.bpm() as i32 + delta).clamp(0, u16::MAX as i32) as u16;
        self.clock.set_tempo(target, now_ms);
    }

    /// Renderer-facing model of the loaded song, if any.
    pub fn render_model(&self) -> Option<RenderModel> {
        let song = self.song.as_ref()?;
        let blocks = song
            .blocks
            .iter()
            .map(|b| RenderBlock {
                chord_segments: b
                    .aligned
                    .chord_segs
                    .iter()
                    .map(|seg| align::blank_duration_suffixes(seg))
                    .collect(),
                lyric_segments: b.aligned.lyric_segs.clone(),
                has_lyrics: !b.lyrics_raw.is_empty(),
            })
            .collect();
        Some(RenderModel {
            meta_line: song.metadata.summary(),
            blocks,
        })
    }

    /// One scheduling tick. Returns `None` while stopped (a no-op poll that
    /// mutates nothing); otherwise the frame to display.
    pub fn tick(&mut self, now_ms: f64) -> Option<Frame> {
        if !self.is_running() {
            return None;
        }

        let global_beat = self.clock.global_beat_at(now_ms);
        let musical_beat = global_beat - self.count_in_beats();
        let beat = self.detect_beat(global_beat);

        // Count-in: no pointer advance, no highlight, no scroll.
        if musical_beat < 0.0 {
            return Some(Frame {
                musical_beat,
                beat,
                count_in_beats_left: Some((-musical_beat).ceil() as u32),
                ..Frame::default()
            });
        }

        if self.events.is_empty() {
            return Some(Frame {
                musical_beat,
                beat,
                ..Frame::default()
            });
        }

        // Advance the pointer monotonically, clamped to the last event.
        let mut idx = self.current_event_index;
        while idx < self.events.len() && musical_beat >= self.events[idx].end_beat {
            idx += 1;
        }
        idx = idx.min(self.events.len() - 1);
        self.current_event_index = idx;

        let mut frame = Frame {
            musical_beat,
            beat,
            now_chord: Some(self.events[idx].chord_name.clone()),
            scroll_block: Some(self.events[idx].block_index),
            ..Frame::default()
        };
        self.highlight_bar_group(idx, musical_beat, &mut frame);

        frame.current_blocks.sort_unstable();
        frame.current_blocks.dedup();
        Some(frame)
    }

    /// Highlight the pointer's whole bar group: every event in the maximal
    /// same-bar run gets its chord segment marked and its lyric segment
    /// filled relative to the bar start, and each event's carry links are
    /// applied.
    fn highlight_bar_group(&self, idx: usize, musical_beat: f64, frame: &mut Frame) {
        let (start, end) = timeline::bar_group(&self.events, idx);
        let bar_beats = self.bar_beats as f64;
        let bar_start_beat = self.events[idx].bar_index as f64 * bar_beats;
        let t_in_bar = (musical_beat - bar_start_beat).clamp(0.0, bar_beats);

        for ev in &self.events[start..=end] {
            // Prefix sits at segment 0, so chord k maps to segment k + 1.
            let segment = ev.chord_index_in_block + 1;
            frame.chord_segments.push(SegmentRef {
                block: ev.block_index,
                segment,
            });
            frame.current_blocks.push(ev.block_index);

            let local_start = ev.start_beat - bar_start_beat;
            let local_end = ev.end_beat - bar_start_beat;
            let span = (local_end - local_start).max(MIN_SPAN);
            let fill = ((t_in_bar - local_start) / span).clamp(0.0, 1.0);
            frame.lyric_fills.push(SegmentFill {
                block: ev.block_index,
                segment,
                fill,
            });

            self.apply_carry(ev, musical_beat, frame);
        }
    }

    /// Resolve carry links keyed by `ev`: fill the linked blocks' prefix
    /// segments according to their offset windows inside the event.
    fn apply_carry(&self, ev: &Event, musical_beat: f64, frame: &mut Frame) {
        let Some(links) = self.carry.get(&ev.event_index) else {
            return;
        };
        let t_in_event = (musical_beat - ev.start_beat).clamp(0.0, ev.dur);

        for link in links {
            let span = (link.end_offset_beats - link.start_offset_beats).max(MIN_SPAN);
            let fill = ((t_in_event - link.start_offset_beats) / span).clamp(0.0, 1.0);
            frame.current_blocks.push(link.target_block_index);
            frame.lyric_fills.push(SegmentFill {
                block: link.target_block_index,
                segment: 0,
                fill,
            });
        }
    }

    /// Emit a beat tick on each distinct integer beat crossing; fires during
    /// count-in too so the metronome covers the lead-in bars.
    fn detect_beat(&mut self, global_beat: f64) -> Option<BeatTick> {
        let beat_index = global_beat.floor() as i64;
        if beat_index == self.last_beat_index {
            return None;
        }
        self.last_beat_index = beat_index;
        let beat_in_bar = (beat_index.rem_euclid(self.bar_beats as i64) + 1) as u32;
        Some(BeatTick {
            beat_in_bar,
            accent: beat_in_bar == 1,
        })
    }
}
