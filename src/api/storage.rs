//! Chart storage implemented in JavaScript
//!
//! The page hands `ChartEditor.withStorage` any object with these methods
//! (localStorage, IndexedDB behind a sync cache, a fetch wrapper):
//!
//! ```text
//! isAvailable(): boolean
//! saveChart(id: string, json: string): void
//! loadChart(id: string): string | null | undefined
//! listCharts(): { id, name, title, updatedAt }[]
//! deleteChart(id: string): void
//! ```
//!
//! Charts cross as chart-JSON strings. A method that throws surfaces as
//! `StorageError::Backend`.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::models::ChordChart;
use crate::schema::validate_chart_json;
use crate::storage::{
    encode_chart, sort_newest_first, ChartSummary, StorageError, StorageProvider,
};

#[wasm_bindgen]
extern "C" {
    /// Any JS object with the chart-store methods above
    pub type JsChartStore;

    #[wasm_bindgen(method, catch, js_name = isAvailable)]
    fn is_available(this: &JsChartStore) -> Result<bool, JsValue>;

    #[wasm_bindgen(method, catch, js_name = saveChart)]
    fn save_chart(this: &JsChartStore, id: &str, json: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = loadChart)]
    fn load_chart(this: &JsChartStore, id: &str) -> Result<Option<String>, JsValue>;

    #[wasm_bindgen(method, catch, js_name = listCharts)]
    fn list_charts(this: &JsChartStore) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = deleteChart)]
    fn delete_chart(this: &JsChartStore, id: &str) -> Result<(), JsValue>;
}

/// [`StorageProvider`] over a [`JsChartStore`]
pub struct JsStorage {
    store: JsChartStore,
}

impl JsStorage {
    pub fn new(store: JsChartStore) -> Self {
        Self { store }
    }

    fn ensure_available(&self) -> Result<(), StorageError> {
        if StorageProvider::is_available(self) {
            Ok(())
        } else {
            Err(StorageError::Unavailable)
        }
    }
}

fn backend_error(err: JsValue) -> StorageError {
    let message = err
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{:?}", err));
    StorageError::Backend(message)
}

impl StorageProvider for JsStorage {
    fn is_available(&self) -> bool {
        self.store.is_available().unwrap_or_else(|e| {
            log::warn!("Chart store availability check threw: {:?}", e);
            false
        })
    }

    fn save_chart(&mut self, chart: &ChordChart) -> Result<(), StorageError> {
        self.ensure_available()?;
        let json = encode_chart(chart)?;
        self.store.save_chart(&chart.id, &json).map_err(backend_error)
    }

    fn load_chart(&self, id: &str) -> Result<Option<ChordChart>, StorageError> {
        self.ensure_available()?;
        let Some(text) = self.store.load_chart(id).map_err(backend_error)? else {
            return Ok(None);
        };
        validate_chart_json(&text)
            .map(Some)
            .map_err(|e| StorageError::Corrupt {
                id: id.to_string(),
                reason: e.to_string(),
            })
    }

    fn list_charts(&self) -> Result<Vec<ChartSummary>, StorageError> {
        self.ensure_available()?;
        let value = self.store.list_charts().map_err(backend_error)?;
        let mut summaries: Vec<ChartSummary> = serde_wasm_bindgen::from_value(value)
            .map_err(|e| StorageError::Backend(format!("listCharts returned {}", e)))?;
        sort_newest_first(&mut summaries);
        Ok(summaries)
    }

    fn delete_chart(&mut self, id: &str) -> Result<(), StorageError> {
        self.ensure_available()?;
        self.store.delete_chart(id).map_err(backend_error)
    }
}
