use crate::watermark::error::WatermarkError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EtlError {
    #[error(transparent)]
    Watermark(#[from] WatermarkError),

    #[error("No API key configured (pass --api-key or set ACCU_API_KEY)")]
    MissingApiKey,

    #[error("No cities configured")]
    NoCities,

    #[error("Failed to build HTTP client")]
    HttpClient(#[from] reqwest::Error),

    #[error("Failed to create data directory '{0}'")]
    DataDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Data path exists but is not a directory: '{0}'")]
    NotADirectory(PathBuf),

    #[error("Failed to determine data directory")]
    DataDirResolution,
}
