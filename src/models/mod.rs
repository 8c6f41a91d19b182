//! Models module for the chord chart editor
//!
//! This module contains the data model behind a chart: chord diagrams,
//! strumming patterns and the chart aggregate, plus the invariant-keeping
//! mutators the editor drives.

pub mod chart;
pub mod chord;
pub mod error;
pub mod ids;
pub mod limits;
pub mod serde_helpers;
pub mod strumming;

// Re-export commonly used types
pub use chart::{ChordChart, DEFAULT_CHORDS_PER_ROW, MAX_CHORDS_PER_ROW};
pub use chord::{
    Barre, ChordDiagram, Finger, FingerLabel, FingerPosition, StringState, DEFAULT_FRETS,
    STRING_COUNT,
};
pub use error::ChartError;
pub use limits::{
    MAX_BARS, MAX_BEATS, MAX_DESCRIPTION_LEN, MAX_FRET, MAX_ID_LEN, MAX_NAME_LEN, MAX_ROWS,
    MAX_SUBTITLE_LEN, MAX_TITLE_LEN,
};
pub use strumming::{
    max_bars_for, slots_per_bar, BeatType, NoteValue, StrumBeat, StrumDirection, Stroke,
    StrummingPattern, Subdivision, TimeSignature,
};
