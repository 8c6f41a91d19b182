//! Chord diagram model
//!
//! A `ChordDiagram` is one fretboard grid: individual finger positions,
//! barres, muted/open markers above the nut, and optional finger-number
//! annotations. The mutators below keep the per-string states exclusive:
//! a string carries at most one of {finger, muted, open}, and a cell is never
//! held by both a finger and a barre.

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use std::ops::RangeInclusive;

use super::error::ChartError;
use super::ids::new_id;
use super::limits::{check_text, MAX_FRET, MAX_ID_LEN, MAX_NAME_LEN};

/// Number of strings on the fretboard (1 = high E, 6 = low E)
pub const STRING_COUNT: u8 = 6;

/// Frets drawn by a freshly created diagram
pub const DEFAULT_FRETS: u8 = 4;

/// A single fretted note: one finger on one string
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FingerPosition {
    pub string: u8,
    pub fret: u8,
}

impl FingerPosition {
    pub fn new(string: u8, fret: u8) -> Self {
        Self { string, fret }
    }
}

/// One finger pressing strings `to_string..=from_string` at `fret`
///
/// `from_string` is always the higher-numbered (lower-pitched) string.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Barre {
    pub fret: u8,
    pub from_string: u8,
    pub to_string: u8,
}

impl Barre {
    /// Build a barre from two string endpoints in either order
    pub fn new(fret: u8, string_a: u8, string_b: u8) -> Self {
        Self {
            fret,
            from_string: string_a.max(string_b),
            to_string: string_a.min(string_b),
        }
    }

    /// Strings covered by this barre (inclusive)
    pub fn strings(&self) -> RangeInclusive<u8> {
        self.to_string..=self.from_string
    }

    /// Check whether the barre holds the given cell
    pub fn covers(&self, string: u8, fret: u8) -> bool {
        self.fret == fret && self.strings().contains(&string)
    }
}

/// Fretting-hand finger, serialized as its number (0 = thumb)
#[derive(Serialize_repr, Deserialize_repr, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Finger {
    Thumb = 0,
    Index = 1,
    Middle = 2,
    Ring = 3,
    Pinky = 4,
}

impl Finger {
    /// Next label when clicking through annotations; `None` removes the label
    pub fn next_in_cycle(self) -> Option<Finger> {
        match self {
            Finger::Thumb => Some(Finger::Index),
            Finger::Index => Some(Finger::Middle),
            Finger::Middle => Some(Finger::Ring),
            Finger::Ring => Some(Finger::Pinky),
            Finger::Pinky => None,
        }
    }

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(n: u8) -> Option<Finger> {
        match n {
            0 => Some(Finger::Thumb),
            1 => Some(Finger::Index),
            2 => Some(Finger::Middle),
            3 => Some(Finger::Ring),
            4 => Some(Finger::Pinky),
            _ => None,
        }
    }
}

/// Finger-number annotation drawn below a string
///
/// Independent of `fingers`: a label may sit on an open or barred string.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FingerLabel {
    pub string: u8,
    pub finger: Finger,
}

/// Marker shown above the nut for a string
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StringState {
    Unset,
    Muted,
    Open,
}

/// One chord's fretboard diagram
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChordDiagram {
    /// Stable identifier, never reused
    pub id: String,

    /// Chord name such as "Am" (empty = unset)
    pub name: String,

    /// Number of frets drawn
    pub frets: u8,

    /// Fret number at the top of the grid (1 = open position, drawn with a nut)
    pub start_fret: u8,

    pub fingers: Vec<FingerPosition>,
    pub barres: Vec<Barre>,
    pub muted_strings: Vec<u8>,
    pub open_strings: Vec<u8>,

    #[serde(default)]
    pub finger_labels: Vec<FingerLabel>,
}

impl ChordDiagram {
    /// Create an empty diagram with the given id
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_frets(id, DEFAULT_FRETS)
    }

    /// Create an empty diagram showing `frets` frets
    pub fn with_frets(id: impl Into<String>, frets: u8) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            frets: frets.max(1),
            start_fret: 1,
            fingers: Vec::new(),
            barres: Vec::new(),
            muted_strings: Vec::new(),
            open_strings: Vec::new(),
            finger_labels: Vec::new(),
        }
    }

    /// Create an empty diagram with a freshly minted id
    pub fn empty() -> Self {
        Self::new(new_id())
    }

    /// A diagram counts as edited once it has a name or any marking.
    /// Unedited diagrams render as placeholders.
    pub fn is_edited(&self) -> bool {
        !self.name.is_empty()
            || !self.fingers.is_empty()
            || !self.barres.is_empty()
            || !self.muted_strings.is_empty()
            || !self.open_strings.is_empty()
    }

    /// Whether the grid draws a nut instead of a fret-number label
    pub fn shows_nut(&self) -> bool {
        self.start_fret == 1
    }

    pub fn finger_on(&self, string: u8) -> Option<&FingerPosition> {
        self.fingers.iter().find(|f| f.string == string)
    }

    pub fn barre_at(&self, fret: u8) -> Option<&Barre> {
        self.barres.iter().find(|b| b.fret == fret)
    }

    pub fn finger_label(&self, string: u8) -> Option<Finger> {
        self.finger_labels
            .iter()
            .find(|l| l.string == string)
            .map(|l| l.finger)
    }

    /// Current above-the-nut marker for a string
    pub fn string_state(&self, string: u8) -> StringState {
        if self.muted_strings.contains(&string) {
            StringState::Muted
        } else if self.open_strings.contains(&string) {
            StringState::Open
        } else {
            StringState::Unset
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), ChartError> {
        let name = name.into();
        check_text("chord name", &name, MAX_NAME_LEN)?;
        self.name = name;
        Ok(())
    }

    /// Cycle a string's marker: unset -> muted -> open -> unset
    ///
    /// A string that becomes muted or open loses its individual finger.
    pub fn toggle_string_top_state(&mut self, string: u8) -> Result<StringState, ChartError> {
        check_string(string)?;

        let next = match self.string_state(string) {
            StringState::Unset => StringState::Muted,
            StringState::Muted => StringState::Open,
            StringState::Open => StringState::Unset,
        };

        remove_value(&mut self.muted_strings, string);
        remove_value(&mut self.open_strings, string);
        match next {
            StringState::Muted => insert_sorted(&mut self.muted_strings, string),
            StringState::Open => insert_sorted(&mut self.open_strings, string),
            StringState::Unset => {}
        }
        if next != StringState::Unset {
            self.fingers.retain(|f| f.string != string);
        }

        Ok(next)
    }

    /// Click on a grid cell
    ///
    /// - the same finger already there: removed (toggle off)
    /// - a barre covers the cell: the barre is removed instead
    /// - otherwise the finger replaces any other finger on that string and
    ///   clears the string's muted/open marker
    pub fn set_finger_at(&mut self, string: u8, fret: u8) -> Result<(), ChartError> {
        check_string(string)?;
        self.check_fret(fret)?;

        let target = FingerPosition::new(string, fret);
        if let Some(pos) = self.fingers.iter().position(|f| *f == target) {
            self.fingers.remove(pos);
            return Ok(());
        }

        if let Some(pos) = self.barres.iter().position(|b| b.covers(string, fret)) {
            self.barres.remove(pos);
            return Ok(());
        }

        self.fingers.retain(|f| f.string != string);
        self.fingers.push(target);
        remove_value(&mut self.muted_strings, string);
        remove_value(&mut self.open_strings, string);
        Ok(())
    }

    /// Place a barre across `string_a..string_b` at `fret`
    ///
    /// Replaces any barre already on that fret, retracts fingers it covers,
    /// and clears muted/open markers on every covered string.
    pub fn set_barre(&mut self, fret: u8, string_a: u8, string_b: u8) -> Result<(), ChartError> {
        check_string(string_a)?;
        check_string(string_b)?;
        self.check_fret(fret)?;
        if string_a == string_b {
            return Err(ChartError::DegenerateBarre);
        }

        let barre = Barre::new(fret, string_a, string_b);
        self.barres.retain(|b| b.fret != fret);
        self.fingers.retain(|f| !barre.covers(f.string, f.fret));
        self.muted_strings.retain(|s| !barre.strings().contains(s));
        self.open_strings.retain(|s| !barre.strings().contains(s));
        self.barres.push(barre);
        Ok(())
    }

    /// Click through finger numbers: none -> 1 -> 2 -> 3 -> 4 -> none
    pub fn cycle_finger_label(&mut self, string: u8) -> Result<Option<Finger>, ChartError> {
        check_string(string)?;

        let next = match self.finger_label(string) {
            None => Some(Finger::Index),
            Some(finger) => finger.next_in_cycle(),
        };

        self.finger_labels.retain(|l| l.string != string);
        if let Some(finger) = next {
            self.finger_labels.push(FingerLabel { string, finger });
            self.finger_labels.sort_by_key(|l| l.string);
        }
        Ok(next)
    }

    pub fn set_start_fret(&mut self, fret: u8) -> Result<(), ChartError> {
        if !(1..=MAX_FRET).contains(&fret) {
            return Err(ChartError::InvalidStartFret(fret));
        }
        self.start_fret = fret;
        Ok(())
    }

    /// Check a diagram that arrived whole (from a command payload or a
    /// preset) against the same bounds the mutators keep
    pub fn check_limits(&self) -> Result<(), ChartError> {
        check_text("chord id", &self.id, MAX_ID_LEN)?;
        check_text("chord name", &self.name, MAX_NAME_LEN)?;
        if !(1..=MAX_FRET).contains(&self.frets) {
            return Err(ChartError::InvalidFretCount(self.frets));
        }
        if !(1..=MAX_FRET).contains(&self.start_fret) {
            return Err(ChartError::InvalidStartFret(self.start_fret));
        }
        for finger in &self.fingers {
            check_string(finger.string)?;
            check_marker_fret(finger.fret)?;
        }
        for barre in &self.barres {
            check_string(barre.from_string)?;
            check_string(barre.to_string)?;
            check_marker_fret(barre.fret)?;
            if barre.from_string == barre.to_string {
                return Err(ChartError::DegenerateBarre);
            }
        }
        for string in self.muted_strings.iter().chain(&self.open_strings) {
            check_string(*string)?;
        }
        for label in &self.finger_labels {
            check_string(label.string)?;
        }
        Ok(())
    }

    /// Reset name and every marking; `id`, `start_fret` and `frets` stay
    pub fn clear(&mut self) {
        self.name.clear();
        self.fingers.clear();
        self.barres.clear();
        self.muted_strings.clear();
        self.open_strings.clear();
        self.finger_labels.clear();
    }

    fn check_fret(&self, fret: u8) -> Result<(), ChartError> {
        if fret < 1 || fret > self.frets {
            return Err(ChartError::FretOutOfRange { fret, frets: self.frets });
        }
        Ok(())
    }
}

/// Stored markers may sit at fret 0 in legacy data
fn check_marker_fret(fret: u8) -> Result<(), ChartError> {
    if fret > MAX_FRET {
        return Err(ChartError::FretOutOfRange { fret, frets: MAX_FRET });
    }
    Ok(())
}

fn check_string(string: u8) -> Result<(), ChartError> {
    if !(1..=STRING_COUNT).contains(&string) {
        return Err(ChartError::StringOutOfRange(string));
    }
    Ok(())
}

fn insert_sorted(strings: &mut Vec<u8>, string: u8) {
    if let Err(pos) = strings.binary_search(&string) {
        strings.insert(pos, string);
    }
}

fn remove_value(strings: &mut Vec<u8>, string: u8) {
    strings.retain(|s| *s != string);
}
