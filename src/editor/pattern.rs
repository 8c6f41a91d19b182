//! Strumming grid interaction
//!
//! The pattern editor works on a draft; the session decides whether the
//! draft becomes the chart's pattern on commit.

use serde::{Deserialize, Serialize};

use crate::models::{ChartError, StrumDirection, StrummingPattern, Subdivision, TimeSignature};
use crate::presets::PresetProvider;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PatternEvent {
    /// Click on a slot's up or down arrow
    #[serde(rename_all = "camelCase")]
    ToggleStroke { index: usize, direction: StrumDirection },
    ToggleNoteValue { index: usize },
    SetBars { bars: u32 },
    #[serde(rename_all = "camelCase")]
    SetTimeSignature { time_signature: TimeSignature },
    SetSubdivision { subdivision: Subdivision },
    /// Fill the grid from a strumming preset in the current meter
    ApplyPreset { id: String },
    Clear,
}

#[derive(Clone, Debug)]
pub struct PatternEditor {
    pattern: StrummingPattern,
}

impl PatternEditor {
    pub fn new(pattern: StrummingPattern) -> Self {
        Self { pattern }
    }

    pub fn pattern(&self) -> &StrummingPattern {
        &self.pattern
    }

    pub fn into_pattern(self) -> StrummingPattern {
        self.pattern
    }

    /// Apply one event; returns whether the pattern changed
    pub fn handle(&mut self, event: PatternEvent, presets: &dyn PresetProvider) -> bool {
        match self.apply(event, presets) {
            Ok(changed) => changed,
            Err(e) => {
                log::warn!("Ignoring strumming edit: {}", e);
                false
            }
        }
    }

    fn apply(&mut self, event: PatternEvent, presets: &dyn PresetProvider) -> Result<bool, ChartError> {
        match event {
            PatternEvent::ToggleStroke { index, direction } => {
                self.pattern.toggle_stroke(index, direction)?;
            }
            PatternEvent::ToggleNoteValue { index } => {
                self.pattern.toggle_note_value(index)?;
            }
            PatternEvent::SetBars { bars } => {
                if bars == self.pattern.bars {
                    return Ok(false);
                }
                self.pattern.resize_bars(bars)?;
            }
            PatternEvent::SetTimeSignature { time_signature } => {
                if time_signature == self.pattern.time_signature {
                    return Ok(false);
                }
                self.pattern.set_time_signature(time_signature)?;
            }
            PatternEvent::SetSubdivision { subdivision } => {
                if subdivision == self.pattern.subdivision {
                    return Ok(false);
                }
                self.pattern.set_subdivision(subdivision)?;
            }
            PatternEvent::ApplyPreset { id } => {
                let Some(preset) = presets.get_strumming_preset(&id) else {
                    log::info!("No strumming preset '{}'", id);
                    return Ok(false);
                };
                self.pattern = preset.apply(
                    self.pattern.bars,
                    self.pattern.time_signature,
                    self.pattern.subdivision,
                );
            }
            PatternEvent::Clear => self.pattern.clear_strokes(),
        }
        Ok(true)
    }
}
