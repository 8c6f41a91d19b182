//! `ChartEditor` class exported to JavaScript
//!
//! One instance per open editor. It owns its session, so nothing is kept in
//! module-level state. Payloads cross the boundary as plain objects in the
//! chart JSON shape; commands and events use a `type` tag, e.g.
//! `{ type: "pointerDown", string: 6, fret: 1 }`.

use wasm_bindgen::prelude::*;

use super::helpers::{
    deserialize, deserialize_or_default, import_error, serialize, storage_error,
};
use super::storage::{JsChartStore, JsStorage};
use crate::editor::{Command, DiagramEvent, EditorConfig, EditorSession, PatternEvent};
use crate::models::{ChordChart, TimeSignature};
use crate::presets::{PresetLibrary, PresetProvider};
use crate::schema::export_file_name;
use crate::storage::{MemoryStorage, StorageProvider};
use crate::{wasm_info, wasm_log, wasm_warn};

#[wasm_bindgen]
pub struct ChartEditor {
    session: EditorSession,
}

#[wasm_bindgen]
impl ChartEditor {
    /// Create an editor; `config` may be omitted or partial
    ///
    /// Charts saved by this editor are held in memory and gone on reload.
    /// Use `withStorage` to persist them.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<ChartEditor, JsValue> {
        Self::build(config, Box::new(MemoryStorage::new()))
    }

    /// Create an editor that saves through a page-supplied chart store
    #[wasm_bindgen(js_name = withStorage)]
    pub fn with_storage(config: JsValue, store: JsChartStore) -> Result<ChartEditor, JsValue> {
        Self::build(config, Box::new(JsStorage::new(store)))
    }

    /// Current chart as a plain object
    pub fn chart(&self) -> Result<JsValue, JsValue> {
        serialize(self.session.chart(), "Failed to serialize chart")
    }

    #[wasm_bindgen(js_name = isDirty)]
    pub fn is_dirty(&self) -> bool {
        self.session.is_dirty()
    }

    /// Apply a chart command; `false` when it was refused
    pub fn dispatch(&mut self, command: JsValue) -> Result<bool, JsValue> {
        let command: Command = deserialize(command, "Invalid command")?;
        wasm_log!("dispatch {}", command.name());
        Ok(self.session.dispatch(command))
    }

    // ========================================================================
    // Chord diagram editing
    // ========================================================================

    #[wasm_bindgen(js_name = openChord)]
    pub fn open_chord(&mut self, row: usize, slot: usize) -> bool {
        self.session.open_chord(row, slot)
    }

    #[wasm_bindgen(js_name = chordEvent)]
    pub fn chord_event(&mut self, event: JsValue) -> Result<bool, JsValue> {
        let event: DiagramEvent = deserialize(event, "Invalid diagram event")?;
        Ok(self.session.chord_event(event))
    }

    /// Draft diagram, or `null` when no chord is open
    #[wasm_bindgen(js_name = editingChord)]
    pub fn editing_chord(&self) -> Result<JsValue, JsValue> {
        serialize(&self.session.editing_chord(), "Failed to serialize diagram")
    }

    /// Barre the current drag would create, or `null`
    #[wasm_bindgen(js_name = barrePreview)]
    pub fn barre_preview(&self) -> Result<JsValue, JsValue> {
        serialize(&self.session.barre_preview(), "Failed to serialize barre")
    }

    #[wasm_bindgen(js_name = commitChord)]
    pub fn commit_chord(&mut self) -> bool {
        self.session.commit_chord()
    }

    #[wasm_bindgen(js_name = cancelEdit)]
    pub fn cancel_edit(&mut self) {
        self.session.cancel_edit();
    }

    // ========================================================================
    // Strumming pattern editing
    // ========================================================================

    #[wasm_bindgen(js_name = openPattern)]
    pub fn open_pattern(&mut self) {
        self.session.open_pattern();
    }

    #[wasm_bindgen(js_name = patternEvent)]
    pub fn pattern_event(&mut self, event: JsValue) -> Result<bool, JsValue> {
        let event: PatternEvent = deserialize(event, "Invalid strumming event")?;
        Ok(self.session.pattern_event(event))
    }

    #[wasm_bindgen(js_name = editingPattern)]
    pub fn editing_pattern(&self) -> Result<JsValue, JsValue> {
        serialize(&self.session.editing_pattern(), "Failed to serialize pattern")
    }

    /// Count labels ("1", "&", "2", ...) for the open pattern
    #[wasm_bindgen(js_name = countLabels)]
    pub fn count_labels(&self) -> Result<JsValue, JsValue> {
        let labels = self.session.editing_pattern().map(|p| p.count_labels());
        serialize(&labels, "Failed to serialize count labels")
    }

    #[wasm_bindgen(js_name = commitPattern)]
    pub fn commit_pattern(&mut self) -> bool {
        self.session.commit_pattern()
    }

    // ========================================================================
    // Document lifecycle
    // ========================================================================

    #[wasm_bindgen(js_name = newChart)]
    pub fn new_chart(&mut self) {
        self.session.new_chart();
    }

    /// Replace the chart with imported JSON; errors are `"malformed: ..."`
    /// or `"schema: ..."`
    #[wasm_bindgen(js_name = importJson)]
    pub fn import_json(&mut self, text: &str) -> Result<(), JsValue> {
        self.session.import_json(text).map_err(import_error)
    }

    #[wasm_bindgen(js_name = exportJson)]
    pub fn export_json(&self) -> Result<String, JsValue> {
        self.session
            .export_json()
            .map_err(|e| JsValue::from_str(&format!("Export failed: {}", e)))
    }

    #[wasm_bindgen(js_name = exportFileName)]
    pub fn export_file_name(&self) -> String {
        export_file_name(self.session.chart())
    }

    pub fn save(&mut self) -> Result<(), JsValue> {
        self.session
            .save()
            .map_err(|e| storage_error("Saving chart", e))
    }

    /// Load a stored chart; `false` when the id is unknown
    pub fn load(&mut self, id: &str) -> Result<bool, JsValue> {
        self.session
            .load(id)
            .map_err(|e| storage_error("Loading chart", e))
    }

    #[wasm_bindgen(js_name = listCharts)]
    pub fn list_charts(&self) -> Result<JsValue, JsValue> {
        let charts = self
            .session
            .list_charts()
            .map_err(|e| storage_error("Listing charts", e))?;
        serialize(&charts, "Failed to serialize chart list")
    }

    #[wasm_bindgen(js_name = deleteChart)]
    pub fn delete_chart(&mut self, id: &str) -> Result<(), JsValue> {
        self.session
            .delete_chart(id)
            .map_err(|e| storage_error("Deleting chart", e))
    }

    // ========================================================================
    // Presets
    // ========================================================================

    #[wasm_bindgen(js_name = searchChordPresets)]
    pub fn search_chord_presets(&self, query: &str) -> Result<JsValue, JsValue> {
        serialize(
            &self.session.presets().search_chord_presets(query),
            "Failed to serialize chord presets",
        )
    }

    /// Strumming presets, optionally only those in `timeSignature`
    #[wasm_bindgen(js_name = listStrummingPresets)]
    pub fn list_strumming_presets(&self, time_signature: Option<String>) -> Result<JsValue, JsValue> {
        let filter = match time_signature.as_deref() {
            None => None,
            Some(text) => match TimeSignature::parse(text) {
                Some(ts) => Some(ts),
                None => {
                    wasm_warn!("Unknown time signature '{}'", text);
                    return Err(JsValue::from_str(&format!("Unknown time signature '{}'", text)));
                }
            },
        };
        serialize(
            &self.session.presets().list_strumming_presets(filter),
            "Failed to serialize strumming presets",
        )
    }
}

impl ChartEditor {
    fn build(config: JsValue, storage: Box<dyn StorageProvider>) -> Result<ChartEditor, JsValue> {
        let config: EditorConfig = deserialize_or_default(config, "Invalid editor config")?;
        let session = EditorSession::new(config, storage, Box::new(PresetLibrary::builtin()));
        wasm_info!("ChartEditor created with chart {}", session.chart().id);
        Ok(ChartEditor { session })
    }
}

/// Suggested download name for a chart object
#[wasm_bindgen(js_name = exportFileName)]
pub fn export_file_name_for(chart: JsValue) -> Result<String, JsValue> {
    let chart: ChordChart = deserialize(chart, "Invalid chart")?;
    Ok(export_file_name(&chart))
}
