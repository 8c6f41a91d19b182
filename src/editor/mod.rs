//! Editor session
//!
//! `EditorSession` owns the chart being edited and is the single place
//! where UI intents become model changes. Chart-level changes arrive as
//! [`Command`]s. Diagram and strumming edits happen on drafts opened with
//! `open_chord`/`open_pattern` and land in the chart only on commit.
//!
//! Storage and presets are injected at construction; the session holds no
//! global state.

pub mod commands;
pub mod config;
pub mod diagram;
pub mod pattern;

use crate::models::{Barre, ChartError, ChordChart, ChordDiagram, StrummingPattern};
use crate::presets::PresetProvider;
use crate::schema::{export_chart_to_json, import_chart_json, ImportError};
use crate::storage::{ChartSummary, StorageError, StorageProvider};

pub use commands::Command;
pub use config::EditorConfig;
pub use diagram::{DiagramEditor, DiagramEvent, DragGesture, GridCell};
pub use pattern::{PatternEditor, PatternEvent};

/// The draft currently open in a modal editor
#[derive(Clone, Debug)]
pub enum ActiveEdit {
    Chord {
        row: usize,
        slot: usize,
        editor: DiagramEditor,
    },
    Pattern(PatternEditor),
}

pub struct EditorSession {
    config: EditorConfig,
    chart: ChordChart,
    storage: Box<dyn StorageProvider>,
    presets: Box<dyn PresetProvider>,
    active: Option<ActiveEdit>,
    dirty: bool,
}

impl EditorSession {
    /// Create a session with a blank chart laid out per `config`
    pub fn new(
        config: EditorConfig,
        storage: Box<dyn StorageProvider>,
        presets: Box<dyn PresetProvider>,
    ) -> Self {
        let config = config.sanitized();
        let chart = config.new_chart();
        Self {
            config,
            chart,
            storage,
            presets,
            active: None,
            dirty: false,
        }
    }

    pub fn chart(&self) -> &ChordChart {
        &self.chart
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn storage(&self) -> &dyn StorageProvider {
        self.storage.as_ref()
    }

    pub fn presets(&self) -> &dyn PresetProvider {
        self.presets.as_ref()
    }

    /// Whether the chart changed since it was created, loaded or saved
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn active_edit(&self) -> Option<&ActiveEdit> {
        self.active.as_ref()
    }

    // ========================================================================
    // Chart commands
    // ========================================================================

    /// Apply a command atomically, reporting why it was refused
    pub fn try_dispatch(&mut self, command: Command) -> Result<(), ChartError> {
        let mut next = self.chart.clone();
        command.execute(&mut next, &self.config)?;
        self.chart = next;
        self.dirty = true;

        if command.changes_layout() && matches!(self.active, Some(ActiveEdit::Chord { .. })) {
            log::debug!("{} moved slots, closing chord edit", command.name());
            self.active = None;
        }
        Ok(())
    }

    /// Apply a command from the UI; a refused command is a logged no-op
    pub fn dispatch(&mut self, command: Command) -> bool {
        let name = command.name();
        match self.try_dispatch(command) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Ignoring {}: {}", name, e);
                false
            }
        }
    }

    // ========================================================================
    // Chord diagram editing
    // ========================================================================

    /// Open the diagram at (row, slot) for editing, replacing any open draft
    pub fn open_chord(&mut self, row: usize, slot: usize) -> bool {
        let Some(diagram) = self.chart.chord_at(row, slot) else {
            log::warn!("No chord at row {} slot {}", row, slot);
            return false;
        };
        self.active = Some(ActiveEdit::Chord {
            row,
            slot,
            editor: DiagramEditor::new(diagram.clone()),
        });
        true
    }

    /// Route a grid event to the open diagram draft
    pub fn chord_event(&mut self, event: DiagramEvent) -> bool {
        match self.active.as_mut() {
            Some(ActiveEdit::Chord { editor, .. }) => editor.handle(event, self.presets.as_ref()),
            _ => {
                log::debug!("Diagram event with no chord open");
                false
            }
        }
    }

    pub fn editing_chord(&self) -> Option<&ChordDiagram> {
        match self.active.as_ref() {
            Some(ActiveEdit::Chord { editor, .. }) => Some(editor.diagram()),
            _ => None,
        }
    }

    pub fn barre_preview(&self) -> Option<Barre> {
        match self.active.as_ref() {
            Some(ActiveEdit::Chord { editor, .. }) => editor.barre_preview(),
            _ => None,
        }
    }

    /// Write the open diagram draft back into its slot
    pub fn commit_chord(&mut self) -> bool {
        match self.active.take() {
            Some(ActiveEdit::Chord { row, slot, editor }) => self.dispatch(Command::ReplaceChord {
                row,
                slot,
                diagram: editor.into_diagram(),
            }),
            other => {
                self.active = other;
                false
            }
        }
    }

    // ========================================================================
    // Strumming pattern editing
    // ========================================================================

    /// Open the chart's pattern (or a fresh one per config) for editing
    pub fn open_pattern(&mut self) {
        let pattern = self
            .chart
            .strumming_pattern
            .clone()
            .unwrap_or_else(|| self.config.new_pattern());
        self.active = Some(ActiveEdit::Pattern(PatternEditor::new(pattern)));
    }

    pub fn pattern_event(&mut self, event: PatternEvent) -> bool {
        match self.active.as_mut() {
            Some(ActiveEdit::Pattern(editor)) => editor.handle(event, self.presets.as_ref()),
            _ => {
                log::debug!("Strumming event with no pattern open");
                false
            }
        }
    }

    pub fn editing_pattern(&self) -> Option<&StrummingPattern> {
        match self.active.as_ref() {
            Some(ActiveEdit::Pattern(editor)) => Some(editor.pattern()),
            _ => None,
        }
    }

    /// Store the draft pattern; a pattern without strokes removes it
    pub fn commit_pattern(&mut self) -> bool {
        match self.active.take() {
            Some(ActiveEdit::Pattern(editor)) => {
                let pattern = editor.into_pattern();
                let pattern = pattern.has_content().then_some(pattern);
                self.dispatch(Command::SetStrummingPattern { pattern })
            }
            other => {
                self.active = other;
                false
            }
        }
    }

    /// Drop whichever draft is open
    pub fn cancel_edit(&mut self) {
        self.active = None;
    }

    // ========================================================================
    // Document lifecycle
    // ========================================================================

    /// Replace the chart with a blank one
    pub fn new_chart(&mut self) {
        self.chart = self.config.new_chart();
        self.active = None;
        self.dirty = false;
        log::info!("New chart {}", self.chart.id);
    }

    /// Replace the chart with an imported one; on error nothing changes
    pub fn import_json(&mut self, text: &str) -> Result<(), ImportError> {
        let chart = import_chart_json(text)?;
        self.chart = chart;
        self.active = None;
        self.dirty = true;
        Ok(())
    }

    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        export_chart_to_json(&self.chart)
    }

    /// Save the chart, stamping `updated_at`
    ///
    /// The in-memory chart keeps its previous stamp if the save fails.
    pub fn save(&mut self) -> Result<(), StorageError> {
        let mut stamped = self.chart.clone();
        stamped.touch();
        match self.storage.save_chart(&stamped) {
            Ok(()) => {
                self.chart.updated_at = stamped.updated_at;
                self.dirty = false;
                log::info!("Saved chart {}", self.chart.id);
                Ok(())
            }
            Err(e) => {
                log::error!("Saving chart {} failed: {}", self.chart.id, e);
                Err(e)
            }
        }
    }

    /// Load a stored chart; `Ok(false)` when no chart has that id
    pub fn load(&mut self, id: &str) -> Result<bool, StorageError> {
        let loaded = self.storage.load_chart(id).map_err(|e| {
            log::error!("Loading chart {} failed: {}", id, e);
            e
        })?;
        match loaded {
            Some(chart) => {
                self.chart = chart;
                self.active = None;
                self.dirty = false;
                Ok(true)
            }
            None => {
                log::info!("No stored chart {}", id);
                Ok(false)
            }
        }
    }

    pub fn list_charts(&self) -> Result<Vec<ChartSummary>, StorageError> {
        self.storage.list_charts().map_err(|e| {
            log::error!("Listing charts failed: {}", e);
            e
        })
    }

    /// Delete a stored chart; the open chart is left as is
    pub fn delete_chart(&mut self, id: &str) -> Result<(), StorageError> {
        self.storage.delete_chart(id).map_err(|e| {
            log::error!("Deleting chart {} failed: {}", id, e);
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StrumDirection, Stroke};
    use crate::presets::PresetLibrary;
    use crate::storage::MemoryStorage;

    fn session() -> EditorSession {
        EditorSession::new(
            EditorConfig::default(),
            Box::new(MemoryStorage::new()),
            Box::new(PresetLibrary::builtin()),
        )
    }

    #[test]
    fn test_refused_command_leaves_chart_untouched() {
        let mut session = session();
        let before = session.chart().clone();
        assert!(!session.dispatch(Command::ChangeChordsPerRow { count: 6 }));
        assert!(!session.dispatch(Command::RemoveRow { index: 0 }));
        assert_eq!(session.chart(), &before);
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_chord_draft_commits_on_commit_only() {
        let mut session = session();
        assert!(session.open_chord(0, 2));
        session.chord_event(DiagramEvent::PointerDown { string: 2, fret: 1 });
        session.chord_event(DiagramEvent::PointerUp { string: 2, fret: 1 });
        assert!(session.editing_chord().is_some_and(|d| d.finger_on(2).is_some()));
        assert!(!session.chart().rows[0][2].is_edited());

        assert!(session.commit_chord());
        assert!(session.chart().rows[0][2].finger_on(2).is_some());
        assert!(session.editing_chord().is_none());
    }

    #[test]
    fn test_layout_change_closes_chord_edit() {
        let mut session = session();
        session.dispatch(Command::AddRow);
        session.open_chord(1, 0);
        session.dispatch(Command::RemoveRow { index: 0 });
        assert!(session.active_edit().is_none());
        assert!(!session.commit_chord());
    }

    #[test]
    fn test_empty_pattern_commit_clears() {
        let mut session = session();
        session.open_pattern();
        session.pattern_event(PatternEvent::ToggleStroke { index: 0, direction: StrumDirection::Down });
        assert!(session.commit_pattern());
        let pattern = session.chart().strumming_pattern.as_ref().unwrap();
        assert_eq!(pattern.beats[0].stroke, Some(Stroke::Down));

        session.open_pattern();
        session.pattern_event(PatternEvent::Clear);
        session.commit_pattern();
        assert!(session.chart().strumming_pattern.is_none());
    }

    #[test]
    fn test_failed_save_keeps_chart() {
        let mut storage = MemoryStorage::new();
        storage.set_available(false);
        let mut session = EditorSession::new(
            EditorConfig::default(),
            Box::new(storage),
            Box::new(PresetLibrary::default()),
        );
        session.dispatch(Command::SetTitle { title: "Draft".to_string() });
        let before = session.chart().clone();
        assert!(session.save().is_err());
        assert_eq!(session.chart(), &before);
        assert!(session.is_dirty());
    }

    #[test]
    fn test_bad_import_keeps_chart() {
        let mut session = session();
        let before = session.chart().clone();
        assert!(session.import_json("{").is_err());
        assert!(session.import_json(r#"{ "chordsPerRow": 100, "rows": [[]] }"#).is_err());
        assert_eq!(session.chart(), &before);
    }
}
