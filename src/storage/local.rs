//! Local filesystem storage implementation.
//!
//! One plain-text file per source inside the state directory, named after
//! the source id and holding the current fingerprint. The directory listing
//! is also how sources are discovered: creating an empty file registers a
//! new source.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── ua          # fingerprint for source "ua"
//! ├── tr
//! └── ua.tmp      # transient, only during an atomic write
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::is_valid_source_id;
use crate::storage::FingerprintStore;

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Get the full path for a source id.
    fn path(&self, id: &str) -> Result<PathBuf> {
        if !is_valid_source_id(id) {
            return Err(AppError::persistence(id, "invalid source id"));
        }
        Ok(self.root_dir.join(id))
    }

    /// Write bytes atomically (write to temp, sync, then rename).
    async fn write_bytes(&self, id: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(id)?;
        let io_err = |e: std::io::Error| AppError::persistence(id, e);

        tokio::fs::create_dir_all(&self.root_dir)
            .await
            .map_err(io_err)?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await.map_err(io_err)?;
        file.write_all(bytes).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)?;
        file.sync_all().await.map_err(io_err)?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await.map_err(io_err)?;
        Ok(())
    }

    /// Read a record, returning None if it doesn't exist.
    async fn read_string(&self, id: &str) -> Result<Option<String>> {
        let path = self.path(id)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| AppError::persistence(id, "fingerprint is not valid UTF-8")),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::persistence(id, e)),
        }
    }

    /// Register a source by creating an empty record if none exists.
    ///
    /// Returns `true` when a new record was created.
    pub async fn track(&self, id: &str) -> Result<bool> {
        if self.read_string(id).await?.is_some() {
            return Ok(false);
        }
        self.write_bytes(id, b"").await?;
        Ok(true)
    }
}

#[async_trait]
impl FingerprintStore for LocalStorage {
    async fn source_ids(&self) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.root_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("State directory {} not found", self.root_dir.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(AppError::config(format!(
                    "cannot list {}: {e}",
                    self.root_dir.display()
                )));
            }
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AppError::config(format!("cannot list sources: {e}")))?
        {
            let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) if is_valid_source_id(&name) => ids.push(name),
                Ok(name) => log::debug!("Ignoring non-source file {name}"),
                Err(name) => log::debug!("Ignoring non-UTF-8 file name {name:?}"),
            }
        }

        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    async fn load(&self, id: &str) -> Result<String> {
        Ok(self
            .read_string(id)
            .await?
            .map(|s| s.trim().to_string())
            .unwrap_or_default())
    }

    async fn save(&self, id: &str, title: &str) -> Result<()> {
        self.write_bytes(id, title.as_bytes()).await
    }
}
