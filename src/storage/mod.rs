//! Chart persistence
//!
//! The editor talks to storage only through [`StorageProvider`]. Which
//! backend sits behind it is decided once at startup and passed in.
//!
//! - [`MemoryStorage`]: process-local map (tests, default in the browser)
//! - `api::storage::JsStorage`: an object supplied by the page
//! - [`FileStorage`]: one JSON file per chart in a directory
//! - [`record::ChartRecord`]: row projection for relational stores

pub mod file;
pub mod record;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::models::ChordChart;
use crate::schema::{export_chart_to_json, validate_chart_json};

pub use file::FileStorage;
pub use record::ChartRecord;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend is not available")]
    Unavailable,

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("chart serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("stored chart '{id}' is unreadable: {reason}")]
    Corrupt { id: String, reason: String },

    #[error("chart id '{0}' cannot be used as a storage key")]
    InvalidId(String),

    #[error("storage backend failed: {0}")]
    Backend(String),

    #[error("chart '{id}' would not load back, refusing to save: {reason}")]
    Invalid { id: String, reason: String },
}

/// Listing entry for a stored chart
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartSummary {
    pub id: String,
    pub name: String,
    pub title: String,
    pub updated_at: DateTime<Utc>,
}

impl From<&ChordChart> for ChartSummary {
    fn from(chart: &ChordChart) -> Self {
        Self {
            id: chart.id.clone(),
            name: chart.name.clone(),
            title: chart.title.clone(),
            updated_at: chart.updated_at,
        }
    }
}

/// Backend-agnostic chart store
pub trait StorageProvider {
    fn is_available(&self) -> bool;

    /// Insert or overwrite the chart stored under `chart.id`
    fn save_chart(&mut self, chart: &ChordChart) -> Result<(), StorageError>;

    fn load_chart(&self, id: &str) -> Result<Option<ChordChart>, StorageError>;

    /// Summaries sorted newest-updated first
    fn list_charts(&self) -> Result<Vec<ChartSummary>, StorageError>;

    /// Deleting an id that is not stored succeeds
    fn delete_chart(&mut self, id: &str) -> Result<(), StorageError>;
}

/// Serialize a chart for storage, refusing anything the load path would reject
///
/// Every provider saves through this so a successful save always reads back.
pub(crate) fn encode_chart(chart: &ChordChart) -> Result<String, StorageError> {
    let json = export_chart_to_json(chart)?;
    validate_chart_json(&json).map_err(|e| StorageError::Invalid {
        id: chart.id.clone(),
        reason: e.to_string(),
    })?;
    Ok(json)
}

/// Newest first; ties broken by id so listings are stable
pub(crate) fn sort_newest_first(summaries: &mut [ChartSummary]) {
    summaries.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Charts held in memory for the lifetime of the provider
#[derive(Clone, Debug)]
pub struct MemoryStorage {
    charts: BTreeMap<String, ChordChart>,
    available: bool,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            charts: BTreeMap::new(),
            available: true,
        }
    }

    /// Simulate an unreachable backend
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    fn ensure_available(&self) -> Result<(), StorageError> {
        if self.available {
            Ok(())
        } else {
            Err(StorageError::Unavailable)
        }
    }
}

impl StorageProvider for MemoryStorage {
    fn is_available(&self) -> bool {
        self.available
    }

    fn save_chart(&mut self, chart: &ChordChart) -> Result<(), StorageError> {
        self.ensure_available()?;
        encode_chart(chart)?;
        self.charts.insert(chart.id.clone(), chart.clone());
        Ok(())
    }

    fn load_chart(&self, id: &str) -> Result<Option<ChordChart>, StorageError> {
        self.ensure_available()?;
        Ok(self.charts.get(id).cloned())
    }

    fn list_charts(&self) -> Result<Vec<ChartSummary>, StorageError> {
        self.ensure_available()?;
        let mut summaries: Vec<_> = self.charts.values().map(ChartSummary::from).collect();
        sort_newest_first(&mut summaries);
        Ok(summaries)
    }

    fn delete_chart(&mut self, id: &str) -> Result<(), StorageError> {
        self.ensure_available()?;
        self.charts.remove(id);
        Ok(())
    }
}
