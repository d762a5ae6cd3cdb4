//! Real-time "now playing" engine.
//!
//! The driver turns a parsed [`Song`](crate::song::Song) plus a wall-clock
//! sample into display frames: which chord segments to highlight, how far
//! each lyric segment has filled, where to scroll, and when the metronome
//! should click.

mod driver;
mod types;


pub use driver::{Player, Transport, DEFAULT_COUNT_IN_BARS, DEFAULT_TEMPO_STEP};
pub use types::{BeatTick, Frame, RenderBlock, RenderModel, SegmentFill, SegmentRef};
