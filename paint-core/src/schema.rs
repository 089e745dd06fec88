//! Persisted session document.
//!
//! The JSON layout is camelCase and every field is optional on read, so that
//! documents written by older clients still load. A field that is `null` or
//! of the wrong type reads as if it were missing.

use serde::{Deserialize, Deserializer, Serialize};

use crate::{Frame, FrameId, FrameManager, PaintResult, PixelStore};

/// Label given to frames stored without one.
const DEFAULT_FRAME_LABEL: &str = "Frame";

fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Document-friendly frame description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameDocument {
    /// Frame identifier. Missing or unparseable ids get a fresh one on load.
    #[serde(default, deserialize_with = "or_default")]
    pub id: Option<String>,
    /// Display label, `"Frame"` when absent.
    #[serde(default, deserialize_with = "or_default")]
    pub label: Option<String>,
    /// Hex payload, empty when absent.
    #[serde(default, deserialize_with = "or_default")]
    pub pixels: Option<String>,
}

impl FrameDocument {
    /// Build from a runtime frame.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PaintError::CoordinateOutOfRange`] if the frame cannot
    /// be hex encoded.
    pub fn from_frame(frame: &Frame) -> PaintResult<Self> {
        Ok(Self {
            id: Some(frame.id.to_string()),
            label: Some(frame.label.clone()),
            pixels: Some(frame.pixels.to_hex()?),
        })
    }

    /// Convert to a runtime frame.
    #[must_use]
    pub fn into_frame(self) -> Frame {
        let id = match self.id.as_deref().map(FrameId::parse) {
            Some(Ok(id)) => id,
            Some(Err(e)) => {
                tracing::debug!("Replacing invalid frame id: {e}");
                FrameId::new()
            }
            None => FrameId::new(),
        };
        Frame {
            id,
            label: self
                .label
                .unwrap_or_else(|| DEFAULT_FRAME_LABEL.to_string()),
            pixels: PixelStore::from_hex(self.pixels.as_deref().unwrap_or_default()),
        }
    }
}

/// Everything that survives a reload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDocument {
    /// Frames in order.
    #[serde(default, deserialize_with = "or_default")]
    pub frames: Vec<FrameDocument>,
    /// Active frame, clamped into range on load.
    #[serde(default, deserialize_with = "or_default")]
    pub active_frame_index: i64,
    /// Whether submission sends every frame.
    #[serde(default, deserialize_with = "or_default")]
    pub animation_enabled: bool,
}

impl SessionDocument {
    /// Snapshot a frame collection.
    ///
    /// # Errors
    ///
    /// Returns an error if any frame cannot be hex encoded.
    pub fn from_frames(frames: &FrameManager, animation_enabled: bool) -> PaintResult<Self> {
        let documents = frames
            .frames()
            .iter()
            .map(FrameDocument::from_frame)
            .collect::<PaintResult<Vec<_>>>()?;
        Ok(Self {
            frames: documents,
            active_frame_index: i64::try_from(frames.active_index()).unwrap_or(0),
            animation_enabled,
        })
    }

    /// Rebuild the frame collection and animation flag.
    ///
    /// Returns `None` when the document has no frames.
    #[must_use]
    pub fn into_frames(self) -> Option<(FrameManager, bool)> {
        let active = usize::try_from(self.active_frame_index.max(0)).unwrap_or(usize::MAX);
        let frames: Vec<Frame> = self
            .frames
            .into_iter()
            .map(FrameDocument::into_frame)
            .collect();
        let manager = FrameManager::from_parts(frames, active)?;
        Some((manager, self.animation_enabled))
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> PaintResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid document.
    pub fn from_json(json: &str) -> PaintResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
