//! Chart aggregate
//!
//! A `ChordChart` is the saved document: metadata, a grid of chord diagrams
//! arranged in rows of `chords_per_row`, one subtitle per row, and an
//! optional strumming pattern.
//!
//! Shape invariants held by every mutator here:
//! - at least one row exists
//! - `row_subtitles.len() == rows.len()`
//! - every row holds exactly `chords_per_row` diagrams
//!
//! They also keep the chart inside the bounds in `limits`, so anything
//! built here exports as JSON that imports again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::chord::{ChordDiagram, DEFAULT_FRETS};
use super::error::ChartError;
use super::ids::{new_id, now};
use super::limits::{
    check_text, MAX_DESCRIPTION_LEN, MAX_NAME_LEN, MAX_ROWS, MAX_SUBTITLE_LEN, MAX_TITLE_LEN,
};
use super::serde_helpers::serialize_option_as_null;
use super::strumming::StrummingPattern;

/// Largest row width the editor offers
pub const MAX_CHORDS_PER_ROW: usize = 5;

/// Row width of a new chart
pub const DEFAULT_CHORDS_PER_ROW: usize = 4;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChordChart {
    pub id: String,
    pub name: String,
    pub title: String,
    pub description: String,
    pub chords_per_row: usize,
    pub rows: Vec<Vec<ChordDiagram>>,
    pub row_subtitles: Vec<String>,

    #[serde(default, serialize_with = "serialize_option_as_null")]
    pub strumming_pattern: Option<StrummingPattern>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for ChordChart {
    fn default() -> Self {
        Self::empty(DEFAULT_CHORDS_PER_ROW, 1, DEFAULT_FRETS)
    }
}

impl ChordChart {
    /// Create a chart from existing content with a new id and matching timestamps
    ///
    /// Rows are fitted to `chords_per_row` and missing subtitles added so the
    /// shape invariants hold from the start.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        chords_per_row: usize,
        rows: Vec<Vec<ChordDiagram>>,
        row_subtitles: Vec<String>,
        strumming_pattern: Option<StrummingPattern>,
    ) -> Self {
        let created = now();
        let mut chart = Self {
            id: new_id(),
            name: String::new(),
            title: title.into(),
            description: description.into(),
            chords_per_row: chords_per_row.max(1),
            rows,
            row_subtitles,
            strumming_pattern,
            created_at: created,
            updated_at: created,
        };
        chart.ensure_shape();
        chart
    }

    /// A blank chart of `row_count` rows of empty diagrams
    pub fn empty(chords_per_row: usize, row_count: usize, frets: u8) -> Self {
        let chords_per_row = chords_per_row.max(1);
        let rows = (0..row_count.max(1))
            .map(|_| empty_row(chords_per_row, frets))
            .collect();
        Self::new("", "", chords_per_row, rows, Vec::new(), None)
    }

    /// Refresh `updated_at`
    pub fn touch(&mut self) {
        self.updated_at = now();
    }

    /// Give the chart a fresh id so it can never overwrite a stored chart
    pub fn renew_id(&mut self) {
        self.id = new_id();
        self.touch();
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), ChartError> {
        let title = title.into();
        check_text("title", &title, MAX_TITLE_LEN)?;
        self.title = title;
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> Result<(), ChartError> {
        let description = description.into();
        check_text("description", &description, MAX_DESCRIPTION_LEN)?;
        self.description = description;
        Ok(())
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), ChartError> {
        let name = name.into();
        check_text("name", &name, MAX_NAME_LEN)?;
        self.name = name;
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// All diagrams, row by row
    pub fn chords(&self) -> impl Iterator<Item = &ChordDiagram> {
        self.rows.iter().flatten()
    }

    pub fn chord_at(&self, row: usize, slot: usize) -> Option<&ChordDiagram> {
        self.rows.get(row).and_then(|r| r.get(slot))
    }

    /// Put a diagram into an existing slot
    pub fn replace_chord(
        &mut self,
        row: usize,
        slot: usize,
        diagram: ChordDiagram,
    ) -> Result<(), ChartError> {
        self.check_slot(row, slot)?;
        diagram.check_limits()?;
        self.rows[row][slot] = diagram;
        Ok(())
    }

    /// Resize every row to `count` diagrams (1..=`MAX_CHORDS_PER_ROW`)
    pub fn change_chords_per_row(&mut self, count: usize) -> Result<(), ChartError> {
        self.change_chords_per_row_within(count, MAX_CHORDS_PER_ROW)
    }

    /// Resize every row to `count` diagrams with a caller-chosen upper bound
    ///
    /// Growing appends new empty diagrams with fresh ids; shrinking drops
    /// diagrams from the right for good.
    pub fn change_chords_per_row_within(
        &mut self,
        count: usize,
        max: usize,
    ) -> Result<(), ChartError> {
        if count < 1 || count > max {
            return Err(ChartError::ChordsPerRowOutOfRange { requested: count, max });
        }
        self.chords_per_row = count;
        for row in &mut self.rows {
            fit_row(row, count);
        }
        Ok(())
    }

    /// Append a row of empty diagrams and an empty subtitle
    pub fn add_row(&mut self) -> Result<(), ChartError> {
        if self.rows.len() >= MAX_ROWS {
            return Err(ChartError::TooManyRows { max: MAX_ROWS });
        }
        let frets = self
            .rows
            .last()
            .and_then(|r| r.first())
            .map_or(DEFAULT_FRETS, |d| d.frets);
        self.rows.push(empty_row(self.chords_per_row, frets));
        self.row_subtitles.push(String::new());
        Ok(())
    }

    /// Remove a row and its subtitle; the last remaining row cannot go
    pub fn remove_row(&mut self, index: usize) -> Result<(), ChartError> {
        if self.rows.len() <= 1 {
            return Err(ChartError::LastRow);
        }
        self.check_row(index)?;
        self.rows.remove(index);
        self.row_subtitles.remove(index);
        Ok(())
    }

    pub fn set_row_subtitle(
        &mut self,
        index: usize,
        subtitle: impl Into<String>,
    ) -> Result<(), ChartError> {
        self.check_row(index)?;
        let subtitle = subtitle.into();
        check_text("row subtitle", &subtitle, MAX_SUBTITLE_LEN)?;
        self.row_subtitles[index] = subtitle;
        Ok(())
    }

    /// Reorder within one row (remove at `from`, insert at `to`)
    pub fn move_chord_within_row(
        &mut self,
        row: usize,
        from: usize,
        to: usize,
    ) -> Result<(), ChartError> {
        self.check_slot(row, from)?;
        self.check_slot(row, to)?;
        let chord = self.rows[row].remove(from);
        self.rows[row].insert(to, chord);
        Ok(())
    }

    /// Drag a chord into another row
    ///
    /// The source slot gets a new empty placeholder. The chord lands in the
    /// first unedited slot of the target row when there is one, even if
    /// that is not where it was dropped; otherwise it is inserted at
    /// `to_slot` and the row's last diagram falls off the end.
    ///
    /// `to_slot` must name an existing slot. A drop just past the end of a
    /// full row is refused, since inserting there and trimming the row
    /// would discard the moved chord itself.
    pub fn move_chord_to_row(
        &mut self,
        from_row: usize,
        from_slot: usize,
        to_row: usize,
        to_slot: usize,
    ) -> Result<(), ChartError> {
        if from_row == to_row {
            return self.move_chord_within_row(from_row, from_slot, to_slot);
        }
        self.check_slot(from_row, from_slot)?;
        self.check_slot(to_row, to_slot)?;

        let frets = self.rows[from_row][from_slot].frets;
        let moved = std::mem::replace(
            &mut self.rows[from_row][from_slot],
            ChordDiagram::with_frets(new_id(), frets),
        );

        let target = &mut self.rows[to_row];
        match target.iter().position(|d| !d.is_edited()) {
            Some(pos) => target[pos] = moved,
            None => {
                target.insert(to_slot, moved);
                target.pop();
            }
        }
        Ok(())
    }

    /// Install or remove the pattern; an installed pattern is re-sliced to
    /// its bar count
    pub fn set_strumming_pattern(
        &mut self,
        pattern: Option<StrummingPattern>,
    ) -> Result<(), ChartError> {
        let pattern = match pattern {
            Some(mut pattern) => {
                pattern.check_limits()?;
                pattern.normalize();
                Some(pattern)
            }
            None => None,
        };
        self.strumming_pattern = pattern;
        Ok(())
    }

    /// The pattern, but only when it actually has strokes
    pub fn active_strumming_pattern(&self) -> Option<&StrummingPattern> {
        self.strumming_pattern.as_ref().filter(|p| p.has_content())
    }

    /// Restore the shape invariants on data from outside the editor
    ///
    /// Guarantees one row, fits every row to `chords_per_row` and pads or
    /// trims subtitles to the row count.
    pub fn ensure_shape(&mut self) {
        self.chords_per_row = self.chords_per_row.max(1);
        if self.rows.is_empty() {
            self.rows.push(Vec::new());
        }
        let count = self.chords_per_row;
        for row in &mut self.rows {
            fit_row(row, count);
        }
        self.row_subtitles.resize(self.rows.len(), String::new());
    }

    fn check_row(&self, index: usize) -> Result<(), ChartError> {
        if index >= self.rows.len() {
            return Err(ChartError::RowOutOfRange { index, len: self.rows.len() });
        }
        Ok(())
    }

    fn check_slot(&self, row: usize, slot: usize) -> Result<(), ChartError> {
        self.check_row(row)?;
        let len = self.rows[row].len();
        if slot >= len {
            return Err(ChartError::SlotOutOfRange { row, slot, len });
        }
        Ok(())
    }
}

fn empty_row(count: usize, frets: u8) -> Vec<ChordDiagram> {
    (0..count).map(|_| ChordDiagram::with_frets(new_id(), frets)).collect()
}

/// Pad with fresh diagrams matching the row's fret count, or truncate
fn fit_row(row: &mut Vec<ChordDiagram>, count: usize) {
    let frets = row.first().map_or(DEFAULT_FRETS, |d| d.frets);
    row.truncate(count);
    while row.len() < count {
        row.push(ChordDiagram::with_frets(new_id(), frets));
    }
}
