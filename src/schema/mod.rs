//! Chart JSON import and export
//!
//! The transport format mirrors `ChordChart` field for field (camelCase).
//! Import is all-or-nothing and reports two distinct failure kinds:
//! text that is not JSON at all, and JSON that breaks the chart contract.

pub mod validate;

use thiserror::Error;

use crate::models::ChordChart;

pub use validate::validate_chart;

/// Why an import was refused
#[derive(Debug, Error)]
pub enum ImportError {
    /// The text is not valid JSON
    #[error("malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Valid JSON that violates the chart schema
    #[error("invalid chart data at {path}: {message}")]
    Schema { path: String, message: String },
}

impl ImportError {
    /// Short machine-readable tag ("malformed" or "schema")
    pub fn kind(&self) -> &'static str {
        match self {
            ImportError::Malformed(_) => "malformed",
            ImportError::Schema { .. } => "schema",
        }
    }

    /// Offending field path for schema errors
    pub fn path(&self) -> Option<&str> {
        match self {
            ImportError::Malformed(_) => None,
            ImportError::Schema { path, .. } => Some(path),
        }
    }
}

/// Parse and validate chart JSON, keeping the document's own id
pub fn validate_chart_json(text: &str) -> Result<ChordChart, ImportError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    validate_chart(value)
}

/// Import a chart file as a new chart
///
/// The imported chart always gets a fresh id and `updated_at`, so it can
/// never overwrite a stored chart that happens to share its id.
pub fn import_chart_json(text: &str) -> Result<ChordChart, ImportError> {
    let mut chart = validate_chart_json(text).map_err(|e| {
        log::warn!("Chart import rejected ({}): {}", e.kind(), e);
        e
    })?;
    let original_id = std::mem::take(&mut chart.id);
    chart.renew_id();
    log::info!(
        "Imported chart '{}' ({} rows) as {} (was {})",
        chart.title,
        chart.rows.len(),
        chart.id,
        original_id
    );
    Ok(chart)
}

/// Serialize a chart for download or storage
pub fn export_chart_to_json(chart: &ChordChart) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(chart)
}

/// Download name for an exported chart, e.g. `chord-chart-autumn-leaves.json`
pub fn export_file_name(chart: &ChordChart) -> String {
    let mut slug = String::new();
    for c in chart.title.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "chord-chart.json".to_string()
    } else {
        format!("chord-chart-{}.json", slug)
    }
}
