//! Error types for rejected model mutations
//!
//! The editor treats every one of these as a logged no-op; callers using the
//! model directly get them back as ordinary `Result` errors.

use thiserror::Error;

use super::limits::{MAX_BARS, MAX_FRET};

/// A mutation request that would break a chart, diagram or pattern invariant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartError {
    #[error("chords per row must be between 1 and {max}, got {requested}")]
    ChordsPerRowOutOfRange { requested: usize, max: usize },

    #[error("cannot remove the last remaining row")]
    LastRow,

    #[error("row {index} out of range (chart has {len} rows)")]
    RowOutOfRange { index: usize, len: usize },

    #[error("slot {slot} out of range in row {row} (row has {len} slots)")]
    SlotOutOfRange { row: usize, slot: usize, len: usize },

    #[error("string {0} out of range (must be 1-6)")]
    StringOutOfRange(u8),

    #[error("fret {fret} out of range (diagram shows frets 1-{frets})")]
    FretOutOfRange { fret: u8, frets: u8 },

    #[error("barre must span at least two strings")]
    DegenerateBarre,

    #[error("start fret {0} out of range (must be 1-{})", MAX_FRET)]
    InvalidStartFret(u8),

    #[error("fret count {0} out of range (must be 1-{})", MAX_FRET)]
    InvalidFretCount(u8),

    #[error("beat {index} out of range (pattern has {len} beats)")]
    BeatOutOfRange { index: usize, len: usize },

    #[error("bar count {0} out of range (must be 1-{})", MAX_BARS)]
    InvalidBars(u32),

    #[error("pattern would have {beats} beats, maximum is {max}")]
    TooManyBeats { beats: usize, max: usize },

    #[error("chart already has the maximum of {max} rows")]
    TooManyRows { max: usize },

    #[error("{field} is {len} characters long, maximum is {max}")]
    TextTooLong { field: &'static str, len: usize, max: usize },
}
