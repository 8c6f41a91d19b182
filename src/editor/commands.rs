//! Chart-level edit commands
//!
//! Every structural change to a chart goes through a `Command`. The session
//! applies a command to a copy of the chart and swaps the copy in only when
//! it succeeds, so no handler ever observes a half-applied edit.

use serde::{Deserialize, Serialize};

use super::config::EditorConfig;
use crate::models::{ChartError, ChordChart, ChordDiagram, StrummingPattern};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    SetTitle { title: String },
    SetDescription { description: String },
    SetName { name: String },
    ChangeChordsPerRow { count: usize },
    AddRow,
    RemoveRow { index: usize },
    SetRowSubtitle { index: usize, subtitle: String },
    MoveChordWithinRow { row: usize, from: usize, to: usize },
    #[serde(rename_all = "camelCase")]
    MoveChordToRow {
        from_row: usize,
        from_slot: usize,
        to_row: usize,
        to_slot: usize,
    },
    ReplaceChord { row: usize, slot: usize, diagram: ChordDiagram },
    /// Reset a slot to an empty diagram (same id and geometry)
    ClearChord { row: usize, slot: usize },
    /// `None` removes the pattern
    SetStrummingPattern { pattern: Option<StrummingPattern> },
}

impl Command {
    /// Execute this command on the chart
    pub fn execute(&self, chart: &mut ChordChart, config: &EditorConfig) -> Result<(), ChartError> {
        match self {
            Command::SetTitle { title } => chart.set_title(title.clone())?,
            Command::SetDescription { description } => {
                chart.set_description(description.clone())?
            }
            Command::SetName { name } => chart.set_name(name.clone())?,
            Command::ChangeChordsPerRow { count } => {
                chart.change_chords_per_row_within(*count, config.max_chords_per_row)?
            }
            Command::AddRow => chart.add_row()?,
            Command::RemoveRow { index } => chart.remove_row(*index)?,
            Command::SetRowSubtitle { index, subtitle } => {
                chart.set_row_subtitle(*index, subtitle.clone())?
            }
            Command::MoveChordWithinRow { row, from, to } => {
                chart.move_chord_within_row(*row, *from, *to)?
            }
            Command::MoveChordToRow {
                from_row,
                from_slot,
                to_row,
                to_slot,
            } => chart.move_chord_to_row(*from_row, *from_slot, *to_row, *to_slot)?,
            Command::ReplaceChord { row, slot, diagram } => {
                chart.replace_chord(*row, *slot, diagram.clone())?
            }
            Command::ClearChord { row, slot } => {
                let mut diagram = chart
                    .chord_at(*row, *slot)
                    .cloned()
                    .ok_or(ChartError::SlotOutOfRange {
                        row: *row,
                        slot: *slot,
                        len: chart.rows.get(*row).map_or(0, Vec::len),
                    })?;
                diagram.clear();
                chart.replace_chord(*row, *slot, diagram)?
            }
            Command::SetStrummingPattern { pattern } => {
                chart.set_strumming_pattern(pattern.clone())?
            }
        }
        Ok(())
    }

    /// Whether row/slot positions may shift, invalidating an open chord edit
    pub fn changes_layout(&self) -> bool {
        matches!(
            self,
            Command::ChangeChordsPerRow { .. }
                | Command::RemoveRow { .. }
                | Command::MoveChordWithinRow { .. }
                | Command::MoveChordToRow { .. }
        )
    }

    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Command::SetTitle { .. } => "setTitle",
            Command::SetDescription { .. } => "setDescription",
            Command::SetName { .. } => "setName",
            Command::ChangeChordsPerRow { .. } => "changeChordsPerRow",
            Command::AddRow => "addRow",
            Command::RemoveRow { .. } => "removeRow",
            Command::SetRowSubtitle { .. } => "setRowSubtitle",
            Command::MoveChordWithinRow { .. } => "moveChordWithinRow",
            Command::MoveChordToRow { .. } => "moveChordToRow",
            Command::ReplaceChord { .. } => "replaceChord",
            Command::ClearChord { .. } => "clearChord",
            Command::SetStrummingPattern { .. } => "setStrummingPattern",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_add_and_remove_row() {
        let config = EditorConfig::default();
        let mut chart = ChordChart::default();
        Command::AddRow.execute(&mut chart, &config).unwrap();
        assert_eq!(chart.rows.len(), 2);
        Command::RemoveRow { index: 0 }.execute(&mut chart, &config).unwrap();
        assert_eq!(
            Command::RemoveRow { index: 0 }.execute(&mut chart, &config),
            Err(ChartError::LastRow)
        );
    }

    #[test]
    fn test_config_limits_chords_per_row() {
        let config = EditorConfig {
            max_chords_per_row: 3,
            ..Default::default()
        };
        let mut chart = ChordChart::default();
        assert!(Command::ChangeChordsPerRow { count: 4 }.execute(&mut chart, &config).is_err());
        assert!(Command::ChangeChordsPerRow { count: 3 }.execute(&mut chart, &config).is_ok());
    }

    #[test]
    fn test_clear_chord_keeps_id() {
        let config = EditorConfig::default();
        let mut chart = ChordChart::default();
        chart.rows[0][1].set_name("D").unwrap();
        let id = chart.rows[0][1].id.clone();
        Command::ClearChord { row: 0, slot: 1 }.execute(&mut chart, &config).unwrap();
        assert_eq!(chart.rows[0][1].id, id);
        assert!(!chart.rows[0][1].is_edited());
    }

    #[test]
    fn test_command_json_shape() {
        let cmd: Command = serde_json::from_str(
            r#"{ "type": "moveChordToRow", "fromRow": 0, "fromSlot": 1, "toRow": 1, "toSlot": 0 }"#,
        )
        .unwrap();
        assert_eq!(
            cmd,
            Command::MoveChordToRow { from_row: 0, from_slot: 1, to_row: 1, to_slot: 0 }
        );
        assert!(cmd.changes_layout());
    }
}
