//! Chord and strumming presets
//!
//! Presets are canned fingerings and strumming patterns looked up by name
//! and applied wholesale. The editor only sees them through
//! [`PresetProvider`]; [`PresetLibrary`] is the built-in implementation,
//! backed by an embedded YAML file parsed once on first use.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    Barre, ChordDiagram, FingerLabel, FingerPosition, Stroke, StrummingPattern, Subdivision,
    TimeSignature,
};

const BUILTIN_YAML: &str = include_str!("library.yaml");

static BUILTIN: Lazy<PresetLibrary> = Lazy::new(|| {
    PresetLibrary::from_yaml(BUILTIN_YAML).unwrap_or_else(|e| {
        log::error!("Built-in preset library failed to load: {}", e);
        PresetLibrary::default()
    })
});

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("preset library is not valid YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("strumming preset '{preset}': unknown stroke symbol '{symbol}'")]
    UnknownStroke { preset: String, symbol: char },

    #[error("strumming preset '{preset}': expected {expected} slots, found {found}")]
    PatternLength {
        preset: String,
        expected: usize,
        found: usize,
    },
}

fn default_start_fret() -> u8 {
    1
}

/// Default fingering for a recognized chord name
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChordPreset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default = "default_start_fret")]
    pub start_fret: u8,
    #[serde(default)]
    pub fingers: Vec<FingerPosition>,
    #[serde(default)]
    pub barres: Vec<Barre>,
    #[serde(default)]
    pub muted_strings: Vec<u8>,
    #[serde(default)]
    pub open_strings: Vec<u8>,
    #[serde(default)]
    pub finger_labels: Vec<FingerLabel>,
}

impl ChordPreset {
    /// Case-insensitive match on id, name or any alias
    pub fn matches(&self, name_or_id: &str) -> bool {
        let wanted = name_or_id.trim();
        self.id.eq_ignore_ascii_case(wanted)
            || self.name.eq_ignore_ascii_case(wanted)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(wanted))
    }

    fn contains(&self, query: &str) -> bool {
        self.id.to_lowercase().contains(query)
            || self.name.to_lowercase().contains(query)
            || self.aliases.iter().any(|a| a.to_lowercase().contains(query))
    }

    /// Highest fret the preset reaches
    pub fn max_fret(&self) -> u8 {
        let fingers = self.fingers.iter().map(|f| f.fret);
        let barres = self.barres.iter().map(|b| b.fret);
        fingers.chain(barres).max().unwrap_or(0)
    }

    /// Overwrite every marking on `diagram` with this preset's
    ///
    /// This is a replace, not a merge. The diagram keeps its id; it takes
    /// the preset's name only when it has none of its own, and grows its
    /// fret count if the shape would not fit.
    pub fn apply_to(&self, diagram: &mut ChordDiagram) {
        diagram.fingers = self.fingers.clone();
        diagram.barres = self.barres.clone();
        diagram.muted_strings = self.muted_strings.clone();
        diagram.open_strings = self.open_strings.clone();
        diagram.finger_labels = self.finger_labels.clone();
        diagram.start_fret = self.start_fret.max(1);
        diagram.frets = diagram.frets.max(self.max_fret());
        if diagram.name.is_empty() {
            diagram.name = self.name.clone();
        }
    }
}

/// A strumming pattern authored for a fixed meter and bar count
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StrummingPreset {
    pub id: String,
    pub name: String,
    pub time_signature: TimeSignature,
    pub bars: u32,
    pub subdivision: Subdivision,
    pub strokes: Vec<Option<Stroke>>,
}

impl StrummingPreset {
    /// Expand the preset to `target_bars` bars in the given meter
    ///
    /// The preset repeats as often as needed and the result is cut to
    /// exactly `target_bars × slots_per_bar` slots. Labels and note values
    /// are computed for the output, not copied. `target_bars` is clamped to
    /// what fits in `MAX_BEATS`.
    pub fn apply(
        &self,
        target_bars: u32,
        time_signature: TimeSignature,
        subdivision: Subdivision,
    ) -> StrummingPattern {
        StrummingPattern::from_repeated_strokes(
            &self.strokes,
            target_bars,
            time_signature,
            subdivision,
        )
    }

    /// Expand the preset in its own meter
    pub fn to_pattern(&self, target_bars: u32) -> StrummingPattern {
        self.apply(target_bars, self.time_signature, self.subdivision)
    }
}

/// Lookup surface the editor uses for presets
pub trait PresetProvider {
    fn list_chord_presets(&self) -> Vec<ChordPreset>;
    fn get_chord_preset(&self, name_or_id: &str) -> Option<ChordPreset>;
    fn search_chord_presets(&self, query: &str) -> Vec<ChordPreset>;
    fn list_strumming_presets(&self, time_signature: Option<TimeSignature>) -> Vec<StrummingPreset>;
    fn get_strumming_preset(&self, id: &str) -> Option<StrummingPreset>;
}

// ============================================================================
// YAML source format
// ============================================================================

#[derive(Deserialize)]
struct LibrarySource {
    #[serde(default)]
    chords: Vec<ChordPreset>,
    #[serde(default)]
    strumming: Vec<StrummingSource>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StrummingSource {
    id: String,
    name: String,
    time_signature: TimeSignature,
    bars: u32,
    subdivision: Subdivision,
    pattern: String,
}

impl StrummingSource {
    fn into_preset(self) -> Result<StrummingPreset, PresetError> {
        let strokes = self
            .pattern
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| match c {
                'D' => Ok(Some(Stroke::Down)),
                'U' => Ok(Some(Stroke::Up)),
                'R' => Ok(Some(Stroke::Rest)),
                '.' => Ok(None),
                symbol => Err(PresetError::UnknownStroke {
                    preset: self.id.clone(),
                    symbol,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let expected =
            self.bars as usize * crate::models::slots_per_bar(self.time_signature, self.subdivision);
        if strokes.len() != expected {
            return Err(PresetError::PatternLength {
                preset: self.id,
                expected,
                found: strokes.len(),
            });
        }

        Ok(StrummingPreset {
            id: self.id,
            name: self.name,
            time_signature: self.time_signature,
            bars: self.bars,
            subdivision: self.subdivision,
            strokes,
        })
    }
}

// ============================================================================
// Built-in library
// ============================================================================

/// In-memory preset collection
#[derive(Clone, Debug, Default)]
pub struct PresetLibrary {
    chords: Vec<ChordPreset>,
    strumming: Vec<StrummingPreset>,
}

impl PresetLibrary {
    /// Parse a library in the built-in YAML format
    pub fn from_yaml(source: &str) -> Result<Self, PresetError> {
        let parsed: LibrarySource = serde_yaml::from_str(source)?;
        let strumming = parsed
            .strumming
            .into_iter()
            .map(StrummingSource::into_preset)
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!(
            "Loaded preset library: {} chords, {} strumming patterns",
            parsed.chords.len(),
            strumming.len()
        );
        Ok(Self {
            chords: parsed.chords,
            strumming,
        })
    }

    /// The presets shipped with the crate
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    pub fn add_chord(&mut self, preset: ChordPreset) {
        self.chords.push(preset);
    }

    pub fn add_strumming(&mut self, preset: StrummingPreset) {
        self.strumming.push(preset);
    }
}

impl PresetProvider for PresetLibrary {
    fn list_chord_presets(&self) -> Vec<ChordPreset> {
        self.chords.clone()
    }

    fn get_chord_preset(&self, name_or_id: &str) -> Option<ChordPreset> {
        self.chords.iter().find(|p| p.matches(name_or_id)).cloned()
    }

    /// Substring search; names that start with the query come first
    fn search_chord_presets(&self, query: &str) -> Vec<ChordPreset> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.list_chord_presets();
        }
        let mut hits: Vec<_> = self.chords.iter().filter(|p| p.contains(&query)).collect();
        hits.sort_by_key(|p| !p.name.to_lowercase().starts_with(&query));
        hits.into_iter().cloned().collect()
    }

    fn list_strumming_presets(&self, time_signature: Option<TimeSignature>) -> Vec<StrummingPreset> {
        self.strumming
            .iter()
            .filter(|p| time_signature.map_or(true, |ts| p.time_signature == ts))
            .cloned()
            .collect()
    }

    fn get_strumming_preset(&self, id: &str) -> Option<StrummingPreset> {
        self.strumming.iter().find(|p| p.id == id).cloned()
    }
}
