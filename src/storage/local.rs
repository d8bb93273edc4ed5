//! Local filesystem watermark store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::Watermark;
use crate::storage::StateStore;

/// Watermark kept in a single JSON file.
#[derive(Debug, Clone)]
pub struct LocalStateStore {
    path: PathBuf,
}

impl LocalStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Read bytes, returning None if the file doesn't exist.
    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[async_trait]
impl StateStore for LocalStateStore {
    async fn load(&self) -> Result<Option<Watermark>> {
        let Some(bytes) = self.read_bytes().await? else {
            log::info!("No state file at {}", self.path.display());
            return Ok(None);
        };
        let watermark = serde_json::from_slice(&bytes).map_err(|e| {
            AppError::state(format!("corrupt state file {}: {e}", self.path.display()))
        })?;
        Ok(Some(watermark))
    }

    async fn save(&self, watermark: &Watermark) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(watermark)?;
        self.write_bytes(&bytes).await.map_err(|e| {
            AppError::state(format!("failed to write {}: {e}", self.path.display()))
        })?;
        log::info!(
            "Saved watermark {} to {}",
            watermark.last_seen_id,
            self.path.display()
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
