//! Relational row projection of a chart
//!
//! The edge store keeps one row per chart. The full chart lives in `notes`
//! as JSON; `chords` is a flattened summary (barres reduced to their fret)
//! that SQL-side listings can read. Reconstruction only ever uses `notes`.

use serde::{Deserialize, Serialize};

use super::{encode_chart, StorageError};
use crate::models::{ChordChart, FingerPosition};
use crate::schema::{validate_chart_json, ImportError};

/// Lossy per-chord summary stored in the `chords` column
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlatChord {
    pub name: String,
    pub fingers: Vec<FingerPosition>,
    pub barres: Vec<u8>,
    pub muted_strings: Vec<u8>,
    pub open_strings: Vec<u8>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartRecord {
    pub id: String,
    pub name: String,
    pub title: String,
    pub description: String,
    /// JSON array of [`FlatChord`]
    pub chords: String,
    /// Full chart JSON
    pub notes: String,
    pub created_at: String,
    pub updated_at: String,
}

impl ChartRecord {
    /// Refuses a chart whose `notes` would fail validation on the way back
    pub fn from_chart(chart: &ChordChart) -> Result<Self, StorageError> {
        let flat: Vec<FlatChord> = chart
            .chords()
            .map(|d| FlatChord {
                name: d.name.clone(),
                fingers: d.fingers.clone(),
                barres: d.barres.iter().map(|b| b.fret).collect(),
                muted_strings: d.muted_strings.clone(),
                open_strings: d.open_strings.clone(),
            })
            .collect();

        Ok(Self {
            id: chart.id.clone(),
            name: chart.name.clone(),
            title: chart.title.clone(),
            description: chart.description.clone(),
            chords: serde_json::to_string(&flat)?,
            notes: encode_chart(chart)?,
            created_at: chart.created_at.to_rfc3339(),
            updated_at: chart.updated_at.to_rfc3339(),
        })
    }

    /// Rebuild the chart from `notes`, validated like any import
    pub fn to_chart(&self) -> Result<ChordChart, ImportError> {
        let mut chart = validate_chart_json(&self.notes)?;
        chart.id = self.id.clone();
        Ok(chart)
    }

    pub fn flat_chords(&self) -> Result<Vec<FlatChord>, serde_json::Error> {
        serde_json::from_str(&self.chords)
    }
}
