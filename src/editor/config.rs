//! Editor configuration
//!
//! Passed in from JavaScript as a plain object (every field optional) or
//! built natively. Values outside what the model supports are clamped.

use serde::{Deserialize, Serialize};

use crate::models::{
    max_bars_for, ChordChart, StrummingPattern, Subdivision, TimeSignature,
    DEFAULT_CHORDS_PER_ROW, DEFAULT_FRETS, MAX_CHORDS_PER_ROW, MAX_FRET, MAX_ROWS,
};
use crate::schema::validate::MAX_IMPORT_CHORDS_PER_ROW;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Frets drawn by new diagrams
    pub default_frets: u8,

    /// Row width of a new chart
    pub default_chords_per_row: usize,

    /// Rows in a new chart
    pub default_rows: usize,

    /// Upper bound offered by the chords-per-row control
    pub max_chords_per_row: usize,

    pub strumming_bars: u32,
    pub strumming_time_signature: TimeSignature,
    pub strumming_subdivision: Subdivision,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_frets: DEFAULT_FRETS,
            default_chords_per_row: DEFAULT_CHORDS_PER_ROW,
            default_rows: 1,
            max_chords_per_row: MAX_CHORDS_PER_ROW,
            strumming_bars: 1,
            strumming_time_signature: TimeSignature::FourFour,
            strumming_subdivision: Subdivision::Eighth,
        }
    }
}

impl EditorConfig {
    /// Clamp every field into its supported range, warning about each change
    pub fn sanitized(mut self) -> Self {
        self.default_frets = clamp("defaultFrets", self.default_frets, 1, MAX_FRET);
        self.max_chords_per_row = clamp(
            "maxChordsPerRow",
            self.max_chords_per_row,
            1,
            MAX_IMPORT_CHORDS_PER_ROW as usize,
        );
        self.default_chords_per_row = clamp(
            "defaultChordsPerRow",
            self.default_chords_per_row,
            1,
            self.max_chords_per_row,
        );
        self.default_rows = clamp("defaultRows", self.default_rows, 1, MAX_ROWS);
        self.strumming_bars = clamp(
            "strummingBars",
            self.strumming_bars,
            1,
            max_bars_for(self.strumming_time_signature, self.strumming_subdivision),
        );
        self
    }

    /// Blank chart laid out per this config
    pub fn new_chart(&self) -> ChordChart {
        ChordChart::empty(self.default_chords_per_row, self.default_rows, self.default_frets)
    }

    /// Empty strumming pattern per this config
    pub fn new_pattern(&self) -> StrummingPattern {
        StrummingPattern::empty(
            self.strumming_bars,
            self.strumming_time_signature,
            self.strumming_subdivision,
        )
    }
}

fn clamp<T: PartialOrd + Copy + std::fmt::Display>(field: &str, value: T, min: T, max: T) -> T {
    let clamped = if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    };
    if clamped != value {
        log::warn!("Config {} = {} out of range, using {}", field, value, clamped);
    }
    clamped
}
