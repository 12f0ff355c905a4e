//! Append-only Parquet datasets.
//!
//! A dataset is a directory of part files named `part-NNNNN.parquet`. The zero-padded
//! sequence makes lexical order equal to append order. Appends write a new part to a
//! temporary file in the same directory and rename it into place, so readers only ever
//! see complete parts and existing parts are never touched. Only one writer per dataset
//! is supported.

pub mod error;
pub mod frames;

use crate::table::error::TableError;
use crate::types::dataset::Dataset;
use log::{debug, info};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::task;

const PART_PREFIX: &str = "part-";
const PART_EXTENSION: &str = ".parquet";

#[derive(Debug, Clone)]
pub struct TableStore {
    root: PathBuf,
}

impl TableStore {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dataset_dir(&self, dataset: Dataset) -> PathBuf {
        self.root.join(dataset.relative_path())
    }

    /// Appends `df` as a new part of `dataset`, creating the dataset if needed.
    ///
    /// Columns that already exist in the dataset must keep their dtype; new columns are
    /// allowed and read back as null for older parts. Returns the number of rows written.
    /// An empty frame writes nothing.
    pub async fn append(&self, dataset: Dataset, df: DataFrame) -> Result<usize, TableError> {
        let rows = df.height();
        if rows == 0 {
            debug!("Nothing to append to {}", dataset);
            return Ok(0);
        }

        let dir = self.dataset_dir(dataset);
        let part_path = task::spawn_blocking(move || write_part(dataset, &dir, df)).await??;
        info!(
            "Appended {} rows to {} ({})",
            rows,
            dataset,
            part_path.display()
        );
        Ok(rows)
    }

    /// Lazily reads every part of `dataset`, or `None` if nothing was appended yet.
    pub fn read(&self, dataset: Dataset) -> Result<Option<LazyFrame>, TableError> {
        let parts = list_parts(&self.dataset_dir(dataset))?;
        if parts.is_empty() {
            return Ok(None);
        }

        let frames = parts
            .iter()
            .map(|part| scan_part(part))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(concat_lf_diagonal(frames, UnionArgs::default())?))
    }

    /// Collects the whole dataset on a blocking thread.
    pub async fn read_all(&self, dataset: Dataset) -> Result<Option<DataFrame>, TableError> {
        let Some(frame) = self.read(dataset)? else {
            return Ok(None);
        };
        let df = task::spawn_blocking(move || frame.collect()).await??;
        Ok(Some(df))
    }
}

fn scan_part(part: &Path) -> Result<LazyFrame, TableError> {
    LazyFrame::scan_parquet(part, Default::default())
        .map_err(|e| TableError::ParquetScan(part.to_path_buf(), e))
}

fn part_index(path: &Path) -> Option<usize> {
    path.file_name()?
        .to_str()?
        .strip_prefix(PART_PREFIX)?
        .strip_suffix(PART_EXTENSION)?
        .parse()
        .ok()
}

/// Part files of a dataset directory in append order. A missing directory has no parts.
fn list_parts(dir: &Path) -> Result<Vec<PathBuf>, TableError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(TableError::ListParts(dir.to_path_buf(), e)),
    };

    let mut parts = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| TableError::ListParts(dir.to_path_buf(), e))?
            .path();
        if let Some(index) = part_index(&path) {
            parts.push((index, path));
        }
    }
    parts.sort_by_key(|(index, _)| *index);
    Ok(parts.into_iter().map(|(_, path)| path).collect())
}

/// Rejects `df` if a column it shares with `part` has a different dtype.
fn check_schema(dataset: Dataset, part: &Path, df: &DataFrame) -> Result<(), TableError> {
    let existing = scan_part(part)?
        .collect_schema()
        .map_err(|e| TableError::ParquetScan(part.to_path_buf(), e))?;

    for column in df.get_columns() {
        if let Some(existing_dtype) = existing.get(column.name().as_str()) {
            if existing_dtype != column.dtype() {
                return Err(TableError::SchemaMismatch {
                    dataset,
                    column: column.name().to_string(),
                    existing: existing_dtype.clone(),
                    found: column.dtype().clone(),
                });
            }
        }
    }
    Ok(())
}

fn write_part(dataset: Dataset, dir: &Path, mut df: DataFrame) -> Result<PathBuf, TableError> {
    std::fs::create_dir_all(dir).map_err(|e| TableError::DatasetDirCreation(dir.to_path_buf(), e))?;

    // Every part is checked: a column dropped by a later part still constrains the dataset.
    let parts = list_parts(dir)?;
    for part in &parts {
        check_schema(dataset, part, &df)?;
    }
    let next_index = parts
        .last()
        .and_then(|p| part_index(p))
        .map_or(0, |i| i + 1);
    let part_path = dir.join(format!("{}{:05}{}", PART_PREFIX, next_index, PART_EXTENSION));

    let mut temp_file =
        NamedTempFile::new_in(dir).map_err(|e| TableError::ParquetWriteIo(dir.to_path_buf(), e))?;
    ParquetWriter::new(temp_file.as_file_mut())
        .with_compression(ParquetCompression::Snappy)
        .finish(&mut df)
        .map_err(|e| TableError::ParquetWritePolars(part_path.clone(), e))?;
    temp_file
        .persist(&part_path)
        .map_err(|e| TableError::PartPersist(part_path.clone(), e))?;

    Ok(part_path)
}
