//! Chord Chart Editor core
//!
//! Guitar chord charts: rows of six-string chord diagrams plus an optional
//! strumming pattern. The crate holds the models and their invariants, the
//! editor state machine that turns pointer and keyboard events into model
//! changes, schema-checked JSON import/export, and the storage and preset
//! provider contracts. It builds natively and as a WASM module.

pub mod models;
pub mod presets;
pub mod schema;
pub mod storage;
pub mod editor;
pub mod api;

// Re-export commonly used types
pub use models::*;
pub use editor::{Command, EditorConfig, EditorSession};
pub use presets::{PresetLibrary, PresetProvider};
pub use schema::{export_chart_to_json, import_chart_json, validate_chart_json, ImportError};
pub use storage::{ChartSummary, MemoryStorage, StorageError, StorageProvider};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    init_logging();

    log::info!("Chord Chart Editor WASM module initialized");
}

#[cfg(feature = "console_log")]
fn init_logging() {
    if let Err(e) = console_log::init_with_level(log::Level::Debug) {
        crate::wasm_warn!("Logger already initialized: {}", e);
    }
}

#[cfg(not(feature = "console_log"))]
fn init_logging() {}
