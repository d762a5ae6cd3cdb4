//! # Error Types
//!
//! Error types for the chordscroll engine.
//!
//! Song text itself never produces errors: malformed front matter, bad time
//! signatures and empty sections all degrade per the parser's rules, so the
//! only fatal condition is failing to read a song source at all. `Load`
//! carries the attempted path and the underlying I/O cause so callers can
//! report the failure without losing whatever song is already loaded.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrollError {
    /// Song file could not be read.
    #[error("failed to load '{path}': {source}")]
    Load {
        path: String,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ScrollError>;
