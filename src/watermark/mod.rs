//! Per-city extraction watermarks: the date of the last forecast admitted for each city.

pub mod error;

use crate::watermark::error::WatermarkError;
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const WATERMARK_FILE_NAME: &str = "last_extracted_dates.json";

/// Date assumed for cities that have never been extracted.
pub fn sentinel_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Mapping from city key to the last admitted forecast date.
///
/// Serialized as a flat JSON object, e.g. `{"Lima": "2024-06-01"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Watermarks {
    dates: BTreeMap<String, NaiveDate>,
}

impl Watermarks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Watermark of `city`, or [`sentinel_date`] if the city has none yet.
    pub fn get(&self, city: &str) -> NaiveDate {
        self.dates.get(city).copied().unwrap_or_else(sentinel_date)
    }

    /// Watermark of `city` if one has been recorded.
    pub fn last(&self, city: &str) -> Option<NaiveDate> {
        self.dates.get(city).copied()
    }

    pub(crate) fn set(&mut self, city: &str, date: NaiveDate) {
        self.dates.insert(city.to_string(), date);
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, NaiveDate)> {
        self.dates.iter().map(|(city, date)| (city.as_str(), *date))
    }
}

impl FromIterator<(String, NaiveDate)> for Watermarks {
    fn from_iter<I: IntoIterator<Item = (String, NaiveDate)>>(iter: I) -> Self {
        Self {
            dates: iter.into_iter().collect(),
        }
    }
}

/// Loads and saves the complete watermark mapping.
///
/// `save` replaces whatever was persisted before; callers pass the full, updated mapping.
pub trait WatermarkStore {
    fn load(&self) -> Result<Watermarks, WatermarkError>;
    fn save(&self, watermarks: &Watermarks) -> Result<(), WatermarkError>;
}

/// Keeps watermarks in a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonWatermarkStore {
    path: PathBuf,
}

impl JsonWatermarkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<metadata_dir>/last_extracted_dates.json`.
    pub fn in_dir(metadata_dir: &Path) -> Self {
        Self::new(metadata_dir.join(WATERMARK_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

impl WatermarkStore for JsonWatermarkStore {
    /// A missing file yields an empty mapping. An unreadable or malformed one is an error,
    /// never an implicit reset.
    fn load(&self) -> Result<Watermarks, WatermarkError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => {
                let watermarks: Watermarks = serde_json::from_slice(&bytes)
                    .map_err(|e| WatermarkError::Decode(self.path.clone(), e))?;
                debug!(
                    "Loaded {} watermarks from {}",
                    watermarks.len(),
                    self.path.display()
                );
                Ok(watermarks)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No watermark file at {}, starting empty", self.path.display());
                Ok(Watermarks::new())
            }
            Err(e) => Err(WatermarkError::Read(self.path.clone(), e)),
        }
    }

    /// Writes to a temporary file next to the target and renames it into place, so a
    /// crash mid-write leaves the previous state intact.
    fn save(&self, watermarks: &Watermarks) -> Result<(), WatermarkError> {
        let dir = self.parent_dir();
        std::fs::create_dir_all(&dir).map_err(|e| WatermarkError::Write(dir.clone(), e))?;

        let body = serde_json::to_vec_pretty(watermarks).map_err(WatermarkError::Encode)?;
        let mut temp_file =
            NamedTempFile::new_in(&dir).map_err(|e| WatermarkError::Write(dir.clone(), e))?;
        temp_file
            .write_all(&body)
            .and_then(|_| temp_file.flush())
            .map_err(|e| WatermarkError::Write(temp_file.path().to_path_buf(), e))?;
        temp_file
            .persist(&self.path)
            .map_err(|e| WatermarkError::Persist(self.path.clone(), e))?;

        debug!(
            "Saved {} watermarks to {}",
            watermarks.len(),
            self.path.display()
        );
        Ok(())
    }
}
