use crate::core::Storage;
use crate::utils::error::{PlotError, Result};
use std::path::PathBuf;

/// Reads inputs from an asset directory and writes outputs under another.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    asset_root: PathBuf,
    output_root: PathBuf,
}

impl LocalStorage {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            asset_root: PathBuf::from("."),
            output_root: output_root.into(),
        }
    }

    pub fn with_asset_root(mut self, asset_root: impl Into<PathBuf>) -> Self {
        self.asset_root = asset_root.into();
        self
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.asset_root.join(path);
        tracing::debug!("Reading {}", full_path.display());
        tokio::fs::read(&full_path)
            .await
            .map_err(|source| PlotError::InputReadError {
                path: full_path.display().to_string(),
                source,
            })
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.output_root.join(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(full_path, data).await?;
        Ok(())
    }
}
