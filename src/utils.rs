use crate::error::EtlError;
use log::info;
use std::io;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "forecast_lake";
const DATA_DIR_NAME: &str = "data";
const METADATA_DIR_NAME: &str = "metadata";

pub fn default_data_dir() -> Result<PathBuf, EtlError> {
    dirs::data_local_dir()
        .ok_or(EtlError::DataDirResolution)
        .map(|p| p.join(APP_DIR_NAME).join(DATA_DIR_NAME))
}

/// `metadata` next to the data directory.
pub fn sibling_metadata_dir(data_dir: &Path) -> PathBuf {
    data_dir
        .parent()
        .unwrap_or(data_dir)
        .join(METADATA_DIR_NAME)
}

pub async fn ensure_dir_exists(path: &Path) -> Result<(), EtlError> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(EtlError::NotADirectory(path.to_path_buf()));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating directory: {}", path.display());
            tokio::fs::create_dir_all(path)
                .await
                .map_err(|e| EtlError::DataDirCreation(path.to_path_buf(), e))
        }
        Err(e) => Err(EtlError::DataDirCreation(path.to_path_buf(), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sibling_metadata_dir() {
        assert_eq!(
            sibling_metadata_dir(Path::new("/srv/forecast_lake/data")),
            PathBuf::from("/srv/forecast_lake/metadata")
        );
        assert_eq!(sibling_metadata_dir(Path::new("data")), PathBuf::from("metadata"));
    }

    #[tokio::test]
    async fn test_ensure_dir_exists() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let nested = dir.path().join("a").join("b");
        ensure_dir_exists(&nested).await?;
        assert!(nested.is_dir());
        ensure_dir_exists(&nested).await?;

        let file = dir.path().join("file");
        std::fs::write(&file, "x")?;
        assert!(matches!(
            ensure_dir_exists(&file).await,
            Err(EtlError::NotADirectory(_))
        ));
        Ok(())
    }
}
