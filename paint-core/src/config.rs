//! Session configuration and the theme contract.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::state::DEFAULT_CANVAS_SIZE;
use crate::{PaintResult, PixelStore, MAX_HISTORY};

/// Tunables for a [`crate::PaintSession`]. Every field is optional in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaintConfig {
    /// Canvas side length used when no theme supplies one.
    pub canvas_size: u32,
    /// Undo snapshots kept.
    pub history_limit: usize,
    /// Quiet period before the working pixels are copied into the active frame.
    pub frame_sync_delay_ms: u64,
    /// Quiet period before the session is written to the store.
    pub persist_delay_ms: u64,
    /// Directory for the persisted session. In-memory when unset.
    pub data_dir: Option<PathBuf>,
}

impl Default for PaintConfig {
    fn default() -> Self {
        Self {
            canvas_size: DEFAULT_CANVAS_SIZE,
            history_limit: MAX_HISTORY,
            frame_sync_delay_ms: 100,
            persist_delay_ms: 500,
            data_dir: None,
        }
    }
}

impl PaintConfig {
    /// Read a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> PaintResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Frame sync quiet period.
    #[must_use]
    pub fn frame_sync_delay(&self) -> Duration {
        Duration::from_millis(self.frame_sync_delay_ms)
    }

    /// Persist quiet period.
    #[must_use]
    pub fn persist_delay(&self) -> Duration {
        Duration::from_millis(self.persist_delay_ms)
    }
}

/// The day's theme: a name, its palette and the canvas size.
///
/// Palette entries are CSS color strings; pixel colors index into them.
/// `canvas` holds what is already painted on the shared canvas as a hex
/// payload, and is drawn behind the animation preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Theme name.
    pub name: String,
    /// Palette, indexed by [`crate::Color`].
    pub palette: Vec<String>,
    /// Canvas side length.
    pub size: u32,
    /// Shared canvas pixels as a hex payload.
    #[serde(default)]
    pub canvas: String,
}

impl Theme {
    /// Create a theme.
    #[must_use]
    pub fn new(name: impl Into<String>, palette: Vec<String>, size: u32) -> Self {
        Self {
            name: name.into(),
            palette,
            size,
            canvas: String::new(),
        }
    }

    /// Decode the shared canvas.
    #[must_use]
    pub fn background(&self) -> PixelStore {
        PixelStore::from_hex(&self.canvas)
    }

    /// CSS color for a palette index.
    #[must_use]
    pub fn color(&self, index: crate::Color) -> Option<&str> {
        self.palette.get(usize::from(index)).map(String::as_str)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::new("Untitled", vec!["#000000".to_string()], DEFAULT_CANVAS_SIZE)
    }
}
