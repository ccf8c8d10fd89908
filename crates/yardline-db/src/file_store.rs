//! JSON document backend.
//!
//! The panel is stored as one pretty-printed JSON file. Saves write a
//! sibling temp file and rename it over the target, so a crash mid-write
//! leaves the previous document intact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use yardline_types::PanelState;

use crate::error::DbError;

/// Reads and writes the panel as a JSON document on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store backed by the file at `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the JSON document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the panel. A missing file yields the empty default panel.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Io`] if the file exists but cannot be read, or
    /// [`DbError::Serialization`] if it is not a valid panel document.
    pub async fn load(&self) -> Result<PanelState, DbError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "State file not found, starting empty");
                return Ok(PanelState::default());
            }
            Err(source) => return Err(self.io_error(source)),
        };

        let panel: PanelState = serde_json::from_slice(&bytes)?;
        tracing::debug!(
            path = %self.path.display(),
            loads = panel.loads.len(),
            records = panel.queue.len(),
            "Loaded panel state"
        );
        Ok(panel)
    }

    /// Write the panel, replacing the previous document atomically.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if the panel cannot be encoded,
    /// or [`DbError::Io`] if the temp file cannot be written or renamed.
    pub async fn save(&self, panel: &PanelState) -> Result<(), DbError> {
        let json = serde_json::to_vec_pretty(panel)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(source))?;
        }

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|source| self.io_error(source))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| self.io_error(source))?;

        tracing::debug!(path = %self.path.display(), bytes = json.len(), "Saved panel state");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> DbError {
        DbError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
