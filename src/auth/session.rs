// ABOUTME: Local key-value persistence for the device session
// ABOUTME: Remembers the last authenticated user and onboarding/verification flags across restarts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Flags remembered across restarts
///
/// This is the only state kept outside the database: just enough to pick the
/// initial route (sign-in, verification prompt, onboarding, or home) before
/// any network call completes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSession {
    /// Last authenticated account, if any
    pub user_id: Option<Uuid>,
    /// Whether that account's email was verified when last seen
    pub email_verified: bool,
    /// Whether that account completed onboarding when last seen
    pub onboarding_complete: bool,
}

/// JSON-file-backed session store
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Create a store backed by the given file
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load the persisted session; a missing file is an empty session
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> AppResult<LocalSession> {
        if !self.path.exists() {
            return Ok(LocalSession::default());
        }

        let raw = fs::read_to_string(&self.path)
            .map_err(|e| AppError::internal(format!("Failed to read session file: {e}")))?;

        serde_json::from_str(&raw)
            .map_err(|e| AppError::internal(format!("Failed to parse session file: {e}")))
    }

    /// Persist the session
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, session: &LocalSession) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::internal(format!("Failed to create session dir: {e}")))?;
        }

        let raw = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, raw)
            .map_err(|e| AppError::internal(format!("Failed to write session file: {e}")))
    }

    /// Forget the persisted session (sign-out)
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self) -> AppResult<()> {
        if !self.path.exists() {
            return Ok(());
        }
        fs::remove_file(&self.path)
            .map_err(|e| AppError::internal(format!("Failed to clear session file: {e}")))
    }

    /// Last authenticated user, if a session is persisted
    ///
    /// # Errors
    ///
    /// Returns an error if the session file cannot be read.
    pub fn last_user_id(&self) -> AppResult<Option<Uuid>> {
        Ok(self.load()?.user_id)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn missing_file_is_empty_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        assert_eq!(store.load().unwrap(), LocalSession::default());
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));

        let session = LocalSession {
            user_id: Some(Uuid::new_v4()),
            email_verified: true,
            onboarding_complete: false,
        };
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), session);
    }

    #[test]
    fn clear_forgets_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));

        store
            .save(&LocalSession {
                user_id: Some(Uuid::new_v4()),
                ..LocalSession::default()
            })
            .unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), LocalSession::default());
        // Clearing twice is fine
        store.clear().unwrap();
    }
}
