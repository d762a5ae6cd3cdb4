//! # Musical Clock
//!
//! Maps wall-clock milliseconds to a continuous global beat value. The clock
//! never reads time itself; callers pass `now_ms`, which keeps every
//! conversion deterministic and testable.
//!
//! Tempo changes keep the beat continuous: the current global beat is
//! sampled under the *old* rate, the anchor pair is reset to that sample,
//! and only then does the new bpm apply. Sampling immediately before and
//! after a tempo change at the same instant yields the same beat.

/// Minimum tempo accepted anywhere in the engine.
pub const MIN_BPM: u16 = 30;

/// Maximum tempo accepted anywhere in the engine.
pub const MAX_BPM: u16 = 260;

/// Tempo used when a song carries no `bpm` metadata.
pub const DEFAULT_BPM: u16 = 120;

/// Beat clock anchored at (`start_time_ms`, `start_global_beat`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clock {
    start_time_ms: f64,
    start_global_beat: f64,
    bpm: u16,
}

impl Clock {
    pub fn new(bpm: u16, now_ms: f64) -> Self {
        Self {
            start_time_ms: now_ms,
            start_global_beat: 0.0,
            bpm: bpm.clamp(MIN_BPM, MAX_BPM),
        }
    }

    pub fn bpm(&self) -> u16 {
        self.bpm
    }

    fn beats_per_second(&self) -> f64 {
        self.bpm as f64 / 60.0
    }

    /// Global beat at wall time `now_ms`.
    pub fn global_beat_at(&self, now_ms: f64) -> f64 {
        let dt = (now_ms - self.start_time_ms) / 1000.0;
        self.start_global_beat + dt * self.beats_per_second()
    }

    /// Change tempo without a beat discontinuity. The anchor is re-based on
    /// the beat sampled under the old rate before the new bpm applies.
    /// Clamped to `[MIN_BPM, MAX_BPM]`; setting the current bpm is a no-op.
    pub fn set_tempo(&mut self, bpm: u16, now_ms: f64) {
        let bpm = bpm.clamp(MIN_BPM, MAX_BPM);
        if bpm == self.bpm {
            return;
        }
        let current = self.global_beat_at(now_ms);
        self.start_global_beat = current;
        self.start_time_ms = now_ms;
        self.bpm = bpm;
    }

    /// Rewind the global beat to zero at `now_ms`, keeping the tempo.
    pub fn restart(&mut self, now_ms: f64) {
        self.start_time_ms = now_ms;
        self.start_global_beat = 0.0;
    }
}
