use crate::types::dataset::Dataset;
use polars::error::PolarsError;
use polars::prelude::DataType;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Failed to create dataset directory '{0}'")]
    DatasetDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to list parts of dataset directory '{0}'")]
    ListParts(PathBuf, #[source] std::io::Error),

    // Errors during parquet writing (inside blocking task)
    #[error("I/O error writing parquet part '{0}'")]
    ParquetWriteIo(PathBuf, #[source] std::io::Error),
    #[error("Encoding error writing parquet part '{0}'")]
    ParquetWritePolars(PathBuf, #[source] PolarsError),
    #[error("Failed to move parquet part into place at '{0}'")]
    PartPersist(PathBuf, #[source] tempfile::PersistError),

    #[error("Failed to scan parquet part '{0}'")]
    ParquetScan(PathBuf, #[source] PolarsError),

    #[error("Column '{column}' of {dataset} is {existing} but the new batch has {found}")]
    SchemaMismatch {
        dataset: Dataset,
        column: String,
        existing: DataType,
        found: DataType,
    },

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
