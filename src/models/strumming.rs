//! Strumming pattern model
//!
//! A pattern is a flat row of strum slots. Its length is always
//! `bars × beats_in_signature × subdivision`; every operation that touches
//! one of those three re-slices `beats` to match, keeping strokes by
//! positional index. No operation may grow a pattern past `MAX_BEATS`
//! slots.

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use std::fmt;

use super::error::ChartError;
use super::limits::{MAX_BARS, MAX_BEATS};
use super::serde_helpers::serialize_option_as_null;

/// Supported meters
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum TimeSignature {
    #[default]
    #[serde(rename = "4/4")]
    FourFour,
    #[serde(rename = "3/4")]
    ThreeFour,
    #[serde(rename = "6/8")]
    SixEight,
}

impl TimeSignature {
    pub const ALL: [TimeSignature; 3] = [
        TimeSignature::FourFour,
        TimeSignature::ThreeFour,
        TimeSignature::SixEight,
    ];

    /// Counted beats per bar
    pub fn beats(self) -> usize {
        match self {
            TimeSignature::FourFour => 4,
            TimeSignature::ThreeFour => 3,
            TimeSignature::SixEight => 6,
        }
    }

    /// Subdivision a new pattern in this meter starts with
    pub fn default_subdivision(self) -> Subdivision {
        match self {
            TimeSignature::FourFour | TimeSignature::ThreeFour => Subdivision::Eighth,
            TimeSignature::SixEight => Subdivision::Triplet,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeSignature::FourFour => "4/4",
            TimeSignature::ThreeFour => "3/4",
            TimeSignature::SixEight => "6/8",
        }
    }

    pub fn parse(s: &str) -> Option<TimeSignature> {
        TimeSignature::ALL.into_iter().find(|ts| ts.as_str() == s)
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strum slots per beat, serialized as the plain number
#[derive(Serialize_repr, Deserialize_repr, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Subdivision {
    /// Eighth notes
    #[default]
    Eighth = 2,
    /// Triplets (the 6/8 default)
    Triplet = 3,
    /// Sixteenth notes
    Sixteenth = 4,
}

impl Subdivision {
    pub fn strokes_per_beat(self) -> usize {
        self as usize
    }

    pub fn from_strokes(n: u64) -> Option<Subdivision> {
        match n {
            2 => Some(Subdivision::Eighth),
            3 => Some(Subdivision::Triplet),
            4 => Some(Subdivision::Sixteenth),
            _ => None,
        }
    }
}

/// What happens in one slot
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Stroke {
    Up,
    Down,
    /// Only produced by presets and imported files
    Rest,
}

impl Stroke {
    pub fn parse(s: &str) -> Option<Stroke> {
        match s {
            "up" => Some(Stroke::Up),
            "down" => Some(Stroke::Down),
            "rest" => Some(Stroke::Rest),
            _ => None,
        }
    }
}

/// Strokes a user can place by clicking the grid
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StrumDirection {
    Up,
    Down,
}

impl From<StrumDirection> for Stroke {
    fn from(direction: StrumDirection) -> Self {
        match direction {
            StrumDirection::Up => Stroke::Up,
            StrumDirection::Down => Stroke::Down,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum NoteValue {
    #[default]
    Full,
    Half,
}

impl NoteValue {
    pub fn toggled(self) -> NoteValue {
        match self {
            NoteValue::Full => NoteValue::Half,
            NoteValue::Half => NoteValue::Full,
        }
    }
}

/// Count label of a slot within its beat (display only)
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum BeatType {
    #[default]
    #[serde(rename = "on")]
    On,
    #[serde(rename = "off")]
    Off,
    #[serde(rename = "&")]
    And,
    #[serde(rename = "e")]
    E,
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "a")]
    A,
}

impl BeatType {
    /// Label for the slot at `index` of a pattern
    pub fn for_slot(index: usize, subdivision: Subdivision) -> BeatType {
        let pos = index % subdivision.strokes_per_beat();
        match subdivision {
            Subdivision::Eighth => [BeatType::On, BeatType::Off][pos],
            Subdivision::Triplet => [BeatType::On, BeatType::And, BeatType::A][pos],
            Subdivision::Sixteenth => {
                [BeatType::On, BeatType::E, BeatType::Plus, BeatType::A][pos]
            }
        }
    }

    /// Text drawn under the slot; on-beats show the beat number
    pub fn label(self, beat_number: usize) -> String {
        match self {
            BeatType::On => beat_number.to_string(),
            BeatType::Off | BeatType::And => "&".to_string(),
            BeatType::E => "e".to_string(),
            BeatType::Plus => "+".to_string(),
            BeatType::A => "a".to_string(),
        }
    }
}

/// One slot of a strumming pattern
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StrumBeat {
    #[serde(default, serialize_with = "serialize_option_as_null")]
    pub stroke: Option<Stroke>,

    #[serde(default)]
    pub note_value: NoteValue,

    #[serde(default)]
    pub beat_type: BeatType,
}

impl StrumBeat {
    /// Empty slot at `index`
    pub fn empty(index: usize, subdivision: Subdivision) -> Self {
        Self {
            stroke: None,
            note_value: NoteValue::Full,
            beat_type: BeatType::for_slot(index, subdivision),
        }
    }
}

/// Slots in one bar
pub fn slots_per_bar(time_signature: TimeSignature, subdivision: Subdivision) -> usize {
    time_signature.beats() * subdivision.strokes_per_beat()
}

/// Most bars a pattern can hold in this meter and subdivision
pub fn max_bars_for(time_signature: TimeSignature, subdivision: Subdivision) -> u32 {
    let per_bar = slots_per_bar(time_signature, subdivision).max(1);
    MAX_BARS.min((MAX_BEATS / per_bar) as u32)
}

fn check_len(
    bars: u32,
    time_signature: TimeSignature,
    subdivision: Subdivision,
) -> Result<(), ChartError> {
    let beats = bars as usize * slots_per_bar(time_signature, subdivision);
    if beats > MAX_BEATS {
        return Err(ChartError::TooManyBeats { beats, max: MAX_BEATS });
    }
    Ok(())
}

/// A strumming pattern spanning one or more bars
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StrummingPattern {
    pub bars: u32,
    pub time_signature: TimeSignature,
    pub subdivision: Subdivision,

    /// Derived from `time_signature`; stored for consumers of the JSON
    pub beats_per_bar: u32,

    pub beats: Vec<StrumBeat>,
}

impl Default for StrummingPattern {
    fn default() -> Self {
        Self::empty(1, TimeSignature::FourFour, Subdivision::Eighth)
    }
}

impl StrummingPattern {
    /// Create a pattern of empty slots
    ///
    /// `bars` is clamped into `1..=max_bars_for(time_signature, subdivision)`.
    pub fn empty(bars: u32, time_signature: TimeSignature, subdivision: Subdivision) -> Self {
        let bars = bars.clamp(1, max_bars_for(time_signature, subdivision));
        let len = bars as usize * slots_per_bar(time_signature, subdivision);
        Self {
            bars,
            time_signature,
            subdivision,
            beats_per_bar: time_signature.beats() as u32,
            beats: (0..len).map(|i| StrumBeat::empty(i, subdivision)).collect(),
        }
    }

    /// Build a pattern by repeating `strokes` and cutting to the exact slot count
    ///
    /// Labels come from each slot's position in the output, never from the
    /// source, so they stay correct when the source was authored in another
    /// meter or subdivision.
    pub fn from_repeated_strokes(
        strokes: &[Option<Stroke>],
        bars: u32,
        time_signature: TimeSignature,
        subdivision: Subdivision,
    ) -> Self {
        let mut pattern = Self::empty(bars, time_signature, subdivision);
        if strokes.is_empty() {
            return pattern;
        }
        for (beat, stroke) in pattern.beats.iter_mut().zip(strokes.iter().cycle()) {
            beat.stroke = *stroke;
        }
        pattern
    }

    /// Slots in one bar of this pattern
    pub fn slots_per_bar(&self) -> usize {
        slots_per_bar(self.time_signature, self.subdivision)
    }

    /// Slot count implied by bars, meter and subdivision
    pub fn required_len(&self) -> usize {
        self.bars as usize * self.slots_per_bar()
    }

    /// A pattern with no strokes is treated as unset
    pub fn has_content(&self) -> bool {
        self.beats.iter().any(|b| b.stroke.is_some())
    }

    /// Click a slot with a direction: same stroke clears it, anything else sets it
    pub fn toggle_stroke(
        &mut self,
        index: usize,
        direction: StrumDirection,
    ) -> Result<Option<Stroke>, ChartError> {
        let len = self.beats.len();
        let beat = self
            .beats
            .get_mut(index)
            .ok_or(ChartError::BeatOutOfRange { index, len })?;

        let stroke = Stroke::from(direction);
        beat.stroke = if beat.stroke == Some(stroke) { None } else { Some(stroke) };
        Ok(beat.stroke)
    }

    pub fn toggle_note_value(&mut self, index: usize) -> Result<NoteValue, ChartError> {
        let len = self.beats.len();
        let beat = self
            .beats
            .get_mut(index)
            .ok_or(ChartError::BeatOutOfRange { index, len })?;
        beat.note_value = beat.note_value.toggled();
        Ok(beat.note_value)
    }

    /// Change the bar count; meter and subdivision are untouched
    pub fn resize_bars(&mut self, bars: u32) -> Result<(), ChartError> {
        if bars < 1 || bars > MAX_BARS {
            return Err(ChartError::InvalidBars(bars));
        }
        check_len(bars, self.time_signature, self.subdivision)?;
        self.bars = bars;
        self.reslice();
        Ok(())
    }

    pub fn set_time_signature(&mut self, time_signature: TimeSignature) -> Result<(), ChartError> {
        check_len(self.bars, time_signature, self.subdivision)?;
        self.time_signature = time_signature;
        self.reslice();
        Ok(())
    }

    pub fn set_subdivision(&mut self, subdivision: Subdivision) -> Result<(), ChartError> {
        check_len(self.bars, self.time_signature, subdivision)?;
        self.subdivision = subdivision;
        self.reslice();
        Ok(())
    }

    /// Reject a pattern built outside the editor that exceeds the size limits
    pub fn check_limits(&self) -> Result<(), ChartError> {
        if self.bars < 1 || self.bars > MAX_BARS {
            return Err(ChartError::InvalidBars(self.bars));
        }
        check_len(self.bars, self.time_signature, self.subdivision)?;
        if self.beats.len() > MAX_BEATS {
            return Err(ChartError::TooManyBeats { beats: self.beats.len(), max: MAX_BEATS });
        }
        Ok(())
    }

    /// Drop every stroke, keeping meter and length
    pub fn clear_strokes(&mut self) {
        for beat in &mut self.beats {
            beat.stroke = None;
        }
    }

    /// Counting labels for the whole grid ("1 & 2 & ...")
    pub fn count_labels(&self) -> Vec<String> {
        let per_beat = self.subdivision.strokes_per_beat();
        let beats_per_bar = self.time_signature.beats();
        self.beats
            .iter()
            .enumerate()
            .map(|(i, beat)| beat.beat_type.label((i / per_beat) % beats_per_bar + 1))
            .collect()
    }

    /// Re-derive everything computable from bars/meter/subdivision
    ///
    /// Used after deserializing data that may predate the current shape.
    pub fn normalize(&mut self) {
        self.bars = self.bars.max(1);
        self.reslice();
    }

    fn reslice(&mut self) {
        self.beats_per_bar = self.time_signature.beats() as u32;
        let len = self.required_len();
        let subdivision = self.subdivision;
        self.beats.truncate(len);
        while self.beats.len() < len {
            let index = self.beats.len();
            self.beats.push(StrumBeat::empty(index, subdivision));
        }
        for (i, beat) in self.beats.iter_mut().enumerate() {
            beat.beat_type = BeatType::for_slot(i, subdivision);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beat_counts() {
        let cases = [
            (1, TimeSignature::FourFour, Subdivision::Eighth, 8),
            (2, TimeSignature::FourFour, Subdivision::Eighth, 16),
            (1, TimeSignature::ThreeFour, Subdivision::Triplet, 9),
            (1, TimeSignature::SixEight, Subdivision::Triplet, 18),
            (2, TimeSignature::ThreeFour, Subdivision::Sixteenth, 24),
        ];
        for (bars, ts, sub, expected) in cases {
            let p = StrummingPattern::empty(bars, ts, sub);
            assert_eq!(p.beats.len(), expected, "{} bars of {} at {:?}", bars, ts, sub);
            assert_eq!(p.beats_per_bar as usize, ts.beats());
        }
    }

    #[test]
    fn test_beat_type_labels() {
        let p = StrummingPattern::empty(1, TimeSignature::FourFour, Subdivision::Sixteenth);
        let types: Vec<_> = p.beats[..4].iter().map(|b| b.beat_type).collect();
        assert_eq!(types, vec![BeatType::On, BeatType::E, BeatType::Plus, BeatType::A]);

        let p = StrummingPattern::empty(1, TimeSignature::ThreeFour, Subdivision::Triplet);
        assert_eq!(p.beats[4].beat_type, BeatType::And);
        assert_eq!(p.beats[5].beat_type, BeatType::A);
    }

    #[test]
    fn test_count_labels() {
        let p = StrummingPattern::empty(1, TimeSignature::ThreeFour, Subdivision::Eighth);
        assert_eq!(p.count_labels(), vec!["1", "&", "2", "&", "3", "&"]);
    }

    #[test]
    fn test_toggle_stroke() {
        let mut p = StrummingPattern::default();
        assert!(!p.has_content());
        assert_eq!(p.toggle_stroke(0, StrumDirection::Down).unwrap(), Some(Stroke::Down));
        assert!(p.has_content());
        assert_eq!(p.toggle_stroke(0, StrumDirection::Up).unwrap(), Some(Stroke::Up));
        assert_eq!(p.toggle_stroke(0, StrumDirection::Up).unwrap(), None);
        assert!(!p.has_content());
        assert_eq!(
            p.toggle_stroke(8, StrumDirection::Up),
            Err(ChartError::BeatOutOfRange { index: 8, len: 8 })
        );
    }

    #[test]
    fn test_resize_bars_preserves_positions() {
        let mut p = StrummingPattern::default();
        p.toggle_stroke(1, StrumDirection::Up).unwrap();
        p.toggle_stroke(7, StrumDirection::Down).unwrap();

        p.resize_bars(2).unwrap();
        assert_eq!(p.beats.len(), 16);
        assert_eq!(p.beats[1].stroke, Some(Stroke::Up));
        assert_eq!(p.beats[7].stroke, Some(Stroke::Down));
        assert!(p.beats[8..].iter().all(|b| b.stroke.is_none()));

        p.resize_bars(1).unwrap();
        assert_eq!(p.beats.len(), 8);
        assert_eq!(p.beats[7].stroke, Some(Stroke::Down));
        assert_eq!(p.time_signature, TimeSignature::FourFour);
        assert_eq!(p.subdivision, Subdivision::Eighth);

        assert_eq!(p.resize_bars(0), Err(ChartError::InvalidBars(0)));
    }

    #[test]
    fn test_subdivision_change_relabels() {
        let mut p = StrummingPattern::default();
        p.toggle_stroke(2, StrumDirection::Down).unwrap();
        p.set_subdivision(Subdivision::Sixteenth).unwrap();
        assert_eq!(p.beats.len(), 16);
        assert_eq!(p.beats[2].stroke, Some(Stroke::Down));
        assert_eq!(p.beats[2].beat_type, BeatType::Plus);
    }

    #[test]
    fn test_time_signature_change_updates_beats_per_bar() {
        let mut p = StrummingPattern::default();
        p.set_time_signature(TimeSignature::SixEight).unwrap();
        assert_eq!(p.beats_per_bar, 6);
        assert_eq!(p.beats.len(), 12);
    }

    #[test]
    fn test_pattern_length_capped() {
        assert_eq!(max_bars_for(TimeSignature::FourFour, Subdivision::Eighth), 16);
        assert_eq!(max_bars_for(TimeSignature::FourFour, Subdivision::Sixteenth), 8);
        assert_eq!(max_bars_for(TimeSignature::SixEight, Subdivision::Sixteenth), 5);

        let mut p = StrummingPattern::default();
        p.set_subdivision(Subdivision::Sixteenth).unwrap();
        assert_eq!(
            p.resize_bars(9),
            Err(ChartError::TooManyBeats { beats: 144, max: MAX_BEATS })
        );
        assert_eq!(p.resize_bars(MAX_BARS + 1), Err(ChartError::InvalidBars(MAX_BARS + 1)));
        p.resize_bars(8).unwrap();
        assert_eq!(p.beats.len(), MAX_BEATS);

        // 8 bars of 6/8 sixteenths would be 192 slots
        let before = p.clone();
        assert_eq!(
            p.set_time_signature(TimeSignature::SixEight),
            Err(ChartError::TooManyBeats { beats: 192, max: MAX_BEATS })
        );
        assert_eq!(p, before);

        let mut p = StrummingPattern::empty(16, TimeSignature::FourFour, Subdivision::Eighth);
        assert!(p.set_subdivision(Subdivision::Triplet).is_err());
        assert_eq!(p.beats.len(), MAX_BEATS);
    }

    #[test]
    fn test_empty_clamps_bars() {
        let p = StrummingPattern::empty(32, TimeSignature::SixEight, Subdivision::Sixteenth);
        assert_eq!(p.bars, 5);
        assert_eq!(p.beats.len(), 120);
        assert!(p.check_limits().is_ok());
    }

    #[test]
    fn test_from_repeated_strokes_truncates() {
        let strokes = vec![Some(Stroke::Down), None, Some(Stroke::Up)];
        let p = StrummingPattern::from_repeated_strokes(
            &strokes,
            1,
            TimeSignature::ThreeFour,
            Subdivision::Eighth,
        );
        let got: Vec<_> = p.beats.iter().map(|b| b.stroke).collect();
        assert_eq!(got, [strokes.clone(), strokes].concat());
    }

    #[test]
    fn test_stroke_serializes_null() {
        let p = StrummingPattern::default();
        let json = serde_json::to_value(&p).unwrap();
        assert!(json["beats"][0]["stroke"].is_null());
        assert_eq!(json["beats"][0]["noteValue"], "full");
        assert_eq!(json["beats"][1]["beatType"], "off");
        assert_eq!(json["timeSignature"], "4/4");
        assert_eq!(json["subdivision"], 2);
    }
}
