// ABOUTME: Blob storage for uploaded profile and chat media
// ABOUTME: Stores size-capped blobs under UUID names and hands back stable retrieval URIs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

use std::path::PathBuf;

use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// URI prefix under which stored blobs are served
const MEDIA_URI_PREFIX: &str = "/media/";

/// File-backed blob store
///
/// Uploads are written under a UUID-derived name; the returned URI is stable
/// for the lifetime of the blob and is what gets persisted on user and post
/// records.
#[derive(Debug, Clone)]
pub struct MediaStore {
    base_dir: PathBuf,
    max_bytes: usize,
}

impl MediaStore {
    /// Open (and create if needed) a blob store rooted at `base_dir`
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn new(base_dir: PathBuf, max_bytes: usize) -> AppResult<Self> {
        fs::create_dir_all(&base_dir).await.map_err(|e| {
            AppError::storage(format!(
                "Failed to create blob directory '{}': {e}",
                base_dir.display()
            ))
        })?;

        info!(path = %base_dir.display(), "Media store initialized");

        Ok(Self {
            base_dir,
            max_bytes,
        })
    }

    /// Store a blob and return its stable retrieval URI
    ///
    /// # Errors
    ///
    /// Returns an error if the blob is empty, exceeds the size cap, or the
    /// write fails. On error nothing is persisted, so callers can safely keep
    /// any previously stored URI.
    pub async fn store(&self, data: &[u8], extension: Option<&str>) -> AppResult<String> {
        if data.is_empty() {
            return Err(AppError::invalid_input("Empty upload"));
        }
        if data.len() > self.max_bytes {
            return Err(AppError::storage(format!(
                "Upload of {} bytes exceeds limit of {} bytes",
                data.len(),
                self.max_bytes
            )));
        }

        let name = extension.map_or_else(
            || Uuid::new_v4().to_string(),
            |ext| format!("{}.{ext}", Uuid::new_v4()),
        );
        let path = self.base_dir.join(&name);

        fs::write(&path, data)
            .await
            .map_err(|e| AppError::storage(format!("Failed to write blob {name}: {e}")))?;

        debug!(name = %name, size = data.len(), "Stored blob");
        Ok(format!("{MEDIA_URI_PREFIX}{name}"))
    }

    /// Read a blob back by name
    ///
    /// # Errors
    ///
    /// Returns an error if the name is malformed, the blob does not exist, or
    /// the read fails.
    pub async fn load(&self, name: &str) -> AppResult<Vec<u8>> {
        let path = self.safe_path(name)?;

        if !path.exists() {
            return Err(AppError::not_found(format!("Blob {name}")));
        }

        fs::read(&path)
            .await
            .map_err(|e| AppError::storage(format!("Failed to read blob {name}: {e}")))
    }

    /// Delete a blob by name
    ///
    /// # Errors
    ///
    /// Returns an error if the name is malformed or the delete fails. Deleting
    /// a missing blob is a no-op.
    pub async fn delete(&self, name: &str) -> AppResult<()> {
        let path = self.safe_path(name)?;

        if !path.exists() {
            return Ok(());
        }

        fs::remove_file(&path)
            .await
            .map_err(|e| AppError::storage(format!("Failed to delete blob {name}: {e}")))?;

        debug!(name = %name, "Deleted blob");
        Ok(())
    }

    /// Extract the blob name from a retrieval URI produced by [`store`](Self::store)
    #[must_use]
    pub fn blob_name(uri: &str) -> Option<&str> {
        uri.strip_prefix(MEDIA_URI_PREFIX)
    }

    /// Resolve a blob name inside the base directory, rejecting traversal
    fn safe_path(&self, name: &str) -> AppResult<PathBuf> {
        if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
            return Err(AppError::invalid_input(format!("Invalid blob name: {name}")));
        }
        Ok(self.base_dir.join(name))
    }
}
