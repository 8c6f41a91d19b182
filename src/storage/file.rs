//! Directory-backed chart storage (one `<id>.json` per chart)

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{encode_chart, sort_newest_first, ChartSummary, StorageError, StorageProvider};
use crate::models::ChordChart;
use crate::schema::validate_chart_json;

#[derive(Clone, Debug)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Use `root` as the chart directory, creating it if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        log::debug!("File storage at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, StorageError> {
        let usable = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !usable {
            return Err(StorageError::InvalidId(id.to_string()));
        }
        Ok(self.root.join(format!("{}.json", id)))
    }

    fn ensure_available(&self) -> Result<(), StorageError> {
        if self.is_available() {
            Ok(())
        } else {
            Err(StorageError::Unavailable)
        }
    }

    fn read_chart(path: &Path, id: &str) -> Result<ChordChart, StorageError> {
        let text = fs::read_to_string(path)?;
        validate_chart_json(&text).map_err(|e| StorageError::Corrupt {
            id: id.to_string(),
            reason: e.to_string(),
        })
    }
}

impl StorageProvider for FileStorage {
    fn is_available(&self) -> bool {
        self.root.is_dir()
    }

    fn save_chart(&mut self, chart: &ChordChart) -> Result<(), StorageError> {
        self.ensure_available()?;
        let path = self.path_for(&chart.id)?;
        let json = encode_chart(chart)?;
        fs::write(&path, json)?;
        Ok(())
    }

    fn load_chart(&self, id: &str) -> Result<Option<ChordChart>, StorageError> {
        self.ensure_available()?;
        let path = self.path_for(id)?;
        if !path.is_file() {
            return Ok(None);
        }
        Self::read_chart(&path, id).map(Some)
    }

    /// Unreadable files are skipped with a warning rather than failing the listing
    fn list_charts(&self) -> Result<Vec<ChartSummary>, StorageError> {
        self.ensure_available()?;
        let mut summaries = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let id = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            match Self::read_chart(&path, &id) {
                Ok(chart) => summaries.push(ChartSummary::from(&chart)),
                Err(e) => log::warn!("Skipping {}: {}", path.display(), e),
            }
        }
        sort_newest_first(&mut summaries);
        Ok(summaries)
    }

    fn delete_chart(&mut self, id: &str) -> Result<(), StorageError> {
        self.ensure_available()?;
        let path = self.path_for(id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
