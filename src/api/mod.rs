//! Chord Chart Editor WASM API
//!
//! The JavaScript-facing surface of the crate.
//!
//! # Module Structure
//!
//! - `helpers`: console logging, JsValue conversion and error mapping
//! - `editor`: the `ChartEditor` class wrapping one editor session
//! - `storage`: chart persistence supplied by the page
//!
//! The free functions below work on chart JSON without an editor instance.

pub mod helpers;
pub mod editor;
pub mod storage;

use wasm_bindgen::prelude::*;

use crate::schema;
use helpers::{import_error, serialize};

pub use editor::{export_file_name_for, ChartEditor};
pub use storage::{JsChartStore, JsStorage};

/// Validate chart JSON and return the chart object, keeping its id
#[wasm_bindgen(js_name = validateChartJson)]
pub fn validate_chart_json(text: &str) -> Result<JsValue, JsValue> {
    let chart = schema::validate_chart_json(text).map_err(import_error)?;
    serialize(&chart, "Failed to serialize chart")
}

/// Import chart JSON as a new chart (fresh id and `updatedAt`)
#[wasm_bindgen(js_name = importChartJson)]
pub fn import_chart_json(text: &str) -> Result<JsValue, JsValue> {
    let chart = schema::import_chart_json(text).map_err(import_error)?;
    crate::wasm_info!("Imported chart {}", chart.id);
    serialize(&chart, "Failed to serialize chart")
}
