use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use super::SavedReport;
use crate::errors::RenderResult;
use crate::services::ReportSink;

/// Saves exported reports into a local directory, creating it on first use.
#[derive(Clone, Debug)]
pub struct FileSystemSink {
    directory: PathBuf,
}

impl FileSystemSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

#[async_trait]
impl ReportSink for FileSystemSink {
    async fn save(&self, filename: &str, bytes: &[u8]) -> RenderResult<SavedReport> {
        if !self.directory.exists() {
            info!("Creating path: {:?}", self.directory);
            tokio::fs::create_dir_all(&self.directory).await?;
        }
        let location = self.directory.join(filename);
        tokio::fs::write(&location, bytes).await?;
        info!("Saved report to {}", location.display());

        Ok(SavedReport {
            filename: filename.to_string(),
            location: Some(location),
            size_bytes: bytes.len(),
        })
    }
}
