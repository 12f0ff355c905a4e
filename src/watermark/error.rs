use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatermarkError {
    #[error("Failed to read watermark file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Watermark file '{0}' is malformed")]
    Decode(PathBuf, #[source] serde_json::Error),

    #[error("Failed to encode watermarks")]
    Encode(#[source] serde_json::Error),

    #[error("Failed to write watermark file '{0}'")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("Failed to move watermark file into place at '{0}'")]
    Persist(PathBuf, #[source] tempfile::PersistError),
}
