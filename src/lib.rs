pub mod align;
pub mod carry;
pub mod clock;
pub mod error;
pub mod parser;
pub mod playback;
pub mod song;
pub mod timeline;

pub use carry::{build_carry_map, CarryLink, CarryMap};
pub use clock::{Clock, DEFAULT_BPM, MAX_BPM, MIN_BPM};
pub use error::{Result, ScrollError};
pub use parser::parse;
pub use playback::{Frame, Player, RenderModel, Transport};
pub use song::{Block, ChordToken, Metadata, Song, TimeSignature};
pub use timeline::{build_events, Event};

/// Parse a chord sheet and lay out its full event timeline.
/// This is the main entry point for the library.
pub fn compile(source: &str) -> (Song, Vec<Event>, CarryMap) {
    let song = parse(source);
    let bar_beats = song.metadata.time_signature.beats_per_bar() as f64;
    let events = build_events(&song.blocks, bar_beats);
    let carry = build_carry_map(&song.blocks, &events);
    (song, events, carry)
}
