//! Session persistence.
//!
//! A [`SessionStore`] holds the latest [`SessionDocument`] in memory and, when
//! given a data directory, mirrors it to a single JSON file. Persistence is
//! best-effort: write failures are logged and never interrupt editing.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::{PaintResult, SessionDocument};

/// Name of the persisted session, used as the file stem.
pub const STORAGE_KEY: &str = "paint-session-v1";

/// Shared session storage.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    document: Arc<RwLock<Option<SessionDocument>>>,
    /// Optional data directory for filesystem persistence.
    data_dir: Option<PathBuf>,
}

impl SessionStore {
    /// Create an in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with filesystem persistence.
    ///
    /// The directory is created if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PaintError::Io`] if the directory cannot be created.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> PaintResult<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self {
            document: Arc::default(),
            data_dir: Some(data_dir),
        })
    }

    /// Data directory, if persistence is enabled.
    #[must_use]
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// Path of the session file, if persistence is enabled.
    #[must_use]
    pub fn file_path(&self) -> Option<PathBuf> {
        self.data_dir
            .as_ref()
            .map(|dir| dir.join(format!("{STORAGE_KEY}.json")))
    }

    /// Store `document`, writing it to disk when a data directory is set.
    pub fn save(&self, document: &SessionDocument) {
        {
            let mut slot = self
                .document
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            *slot = Some(document.clone());
        }
        let Some(path) = self.file_path() else {
            return;
        };
        let json = match document.to_json() {
            Ok(j) => j,
            Err(e) => {
                tracing::warn!("Failed to serialize session: {e}");
                return;
            }
        };
        if let Err(e) = std::fs::write(&path, json) {
            tracing::warn!("Failed to persist session to {}: {e}", path.display());
        }
    }

    /// The most recently stored document.
    ///
    /// With a data directory the file is authoritative. A missing or
    /// unreadable file yields `None`.
    #[must_use]
    pub fn load(&self) -> Option<SessionDocument> {
        let Some(path) = self.file_path() else {
            return self
                .document
                .read()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .clone();
        };
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Failed to read session from {}: {e}", path.display());
                return None;
            }
        };
        match SessionDocument::from_json(&contents) {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::warn!("Ignoring corrupt session file {}: {e}", path.display());
                None
            }
        }
    }

    /// Forget the stored session, removing the file if there is one.
    pub fn clear(&self) {
        {
            let mut slot = self
                .document
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            *slot = None;
        }
        if let Some(path) = self.file_path() {
            if let Err(e) = std::fs::remove_file(&path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to delete session file {}: {e}", path.display());
                }
            }
        }
    }
}
