//! Animation frames.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::PixelStore;

/// Unique identifier for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameId(Uuid);

impl FrameId {
    /// Create a new unique frame ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse from a UUID string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid UUID.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for FrameId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FrameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One animation frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Stable identifier.
    pub id: FrameId,
    /// Display label.
    pub label: String,
    /// Frame content.
    pub pixels: PixelStore,
}

impl Frame {
    /// Create an empty frame with a fresh ID.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: FrameId::new(),
            label: label.into(),
            pixels: PixelStore::new(),
        }
    }
}

/// Ordered frame collection with an active index.
///
/// There is always at least one frame and the active index always points at
/// one of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameManager {
    frames: Vec<Frame>,
    active: usize,
}

impl Default for FrameManager {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameManager {
    /// A collection holding a single empty `Frame 1`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::new("Frame 1")],
            active: 0,
        }
    }

    /// Rebuild a collection, clamping `active` into range.
    ///
    /// Returns `None` for an empty frame list.
    #[must_use]
    pub fn from_parts(frames: Vec<Frame>, active: usize) -> Option<Self> {
        if frames.is_empty() {
            return None;
        }
        let active = active.min(frames.len() - 1);
        Some(Self { frames, active })
    }

    /// All frames in order.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Number of frames (never zero).
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always `false`; provided for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Index of the active frame.
    #[must_use]
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// The active frame.
    #[must_use]
    pub fn active_frame(&self) -> &Frame {
        &self.frames[self.active]
    }

    /// Frame at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Append an empty frame labelled `Frame N` and make it active.
    ///
    /// Returns the new frame's index.
    pub fn add_frame(&mut self) -> usize {
        let label = format!("Frame {}", self.frames.len() + 1);
        self.frames.push(Frame::new(label));
        self.active = self.frames.len() - 1;
        tracing::debug!("Added frame {}", self.active);
        self.active
    }

    /// Remove the frame at `index`.
    ///
    /// Refused (returns `false`) for the last remaining frame or an
    /// out-of-range index. The active index is clamped to the new length.
    pub fn delete_frame(&mut self, index: usize) -> bool {
        if self.frames.len() <= 1 || index >= self.frames.len() {
            return false;
        }
        self.frames.remove(index);
        self.active = self.active.min(self.frames.len() - 1);
        tracing::debug!("Deleted frame {index}, active is now {}", self.active);
        true
    }

    /// Make `index` active, clamped to `[0, len)`. Returns the new active index.
    pub fn switch_frame(&mut self, index: usize) -> usize {
        self.active = index.min(self.frames.len() - 1);
        self.active
    }

    /// Copy the frame at `index` into a new frame inserted right after it,
    /// labelled `<label> (copy)`, and make the copy active.
    ///
    /// Out-of-range indices are ignored (returns `false`).
    pub fn duplicate_frame(&mut self, index: usize) -> bool {
        let Some(source) = self.frames.get(index) else {
            return false;
        };
        let copy = Frame {
            id: FrameId::new(),
            label: format!("{} (copy)", source.label),
            pixels: source.pixels.clone(),
        };
        self.frames.insert(index + 1, copy);
        self.active = index + 1;
        true
    }

    /// Replace the pixels of the frame at `index`. Out-of-range is ignored.
    pub fn update_frame_pixels(&mut self, index: usize, pixels: PixelStore) -> bool {
        match self.frames.get_mut(index) {
            Some(frame) => {
                frame.pixels = pixels;
                true
            }
            None => false,
        }
    }

    /// Frames `0..=index` overlaid in order, later frames on top.
    ///
    /// `index` is clamped to the last frame.
    #[must_use]
    pub fn composite(&self, index: usize) -> PixelStore {
        let end = index.min(self.frames.len() - 1);
        let mut out = PixelStore::new();
        for frame in &self.frames[..=end] {
            out.mutate_many(frame.pixels.iter().map(|p| (p.x, p.y, Some(p.color))));
        }
        out
    }

    /// Occupied pixels summed over every frame.
    #[must_use]
    pub fn total_pixel_count(&self) -> usize {
        self.frames.iter().map(|f| f.pixels.len()).sum()
    }
}

/// Brush strength left after painting `pixel_count` pixels.
///
/// Display only; the result may go negative and is never enforced.
#[must_use]
pub fn remaining_strength(strength: u64, used: u64, pixel_count: usize) -> i128 {
    let count = i128::try_from(pixel_count).unwrap_or(i128::MAX);
    i128::from(strength) - i128::from(used) - count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(manager: &FrameManager) -> Vec<&str> {
        manager.frames().iter().map(|f| f.label.as_str()).collect()
    }

    #[test]
    fn test_new_has_one_frame() {
        let manager = FrameManager::new();
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.active_index(), 0);
        assert_eq!(labels(&manager), vec!["Frame 1"]);
    }

    #[test]
    fn test_add_frame_becomes_active() {
        let mut manager = FrameManager::new();
        assert_eq!(manager.add_frame(), 1);
        assert_eq!(manager.add_frame(), 2);
        assert_eq!(labels(&manager), vec!["Frame 1", "Frame 2", "Frame 3"]);
        assert_eq!(manager.active_index(), 2);
    }

    #[test]
    fn test_delete_last_frame_refused() {
        let mut manager = FrameManager::new();
        assert!(!manager.delete_frame(0));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_delete_clamps_active() {
        let mut manager = FrameManager::new();
        manager.add_frame();
        manager.add_frame();
        assert!(manager.delete_frame(2));
        assert_eq!(manager.active_index(), 1);
        assert!(!manager.delete_frame(7));
    }

    #[test]
    fn test_delete_middle_while_last_active() {
        let mut manager = FrameManager::new();
        manager.add_frame();
        manager.add_frame();
        assert_eq!(manager.active_index(), 2);
        assert!(manager.delete_frame(1));
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.active_index(), 1);
        assert_eq!(labels(&manager), vec!["Frame 1", "Frame 3"]);
    }

    #[test]
    fn test_delete_before_active_keeps_index() {
        let mut manager = FrameManager::new();
        manager.add_frame();
        manager.add_frame();
        manager.switch_frame(1);
        manager.delete_frame(0);
        assert_eq!(manager.active_index(), 1);
        assert_eq!(manager.active_frame().label, "Frame 3");
    }

    #[test]
    fn test_switch_clamps() {
        let mut manager = FrameManager::new();
        manager.add_frame();
        assert_eq!(manager.switch_frame(10), 1);
        assert_eq!(manager.switch_frame(0), 0);
    }

    #[test]
    fn test_duplicate_inserts_after_source() {
        let mut manager = FrameManager::new();
        manager.update_frame_pixels(0, PixelStore::new().set(1, 1, Some(2)));
        manager.add_frame();
        assert!(manager.duplicate_frame(0));
        assert_eq!(labels(&manager), vec!["Frame 1", "Frame 1 (copy)", "Frame 2"]);
        assert_eq!(manager.active_index(), 1);
        assert_eq!(manager.active_frame().pixels.get(1, 1), Some(2));
        assert_ne!(manager.frames()[0].id, manager.frames()[1].id);
        assert!(!manager.duplicate_frame(9));
        assert_eq!(manager.len(), 3);
    }

    #[test]
    fn test_composite_overlays_in_order() {
        let mut manager = FrameManager::new();
        manager.update_frame_pixels(0, PixelStore::new().set_many([(0, 0, Some(1)), (1, 0, Some(1))]));
        manager.add_frame();
        manager.update_frame_pixels(1, PixelStore::new().set(1, 0, Some(5)));

        let first = manager.composite(0);
        assert_eq!(first.get(1, 0), Some(1));

        let both = manager.composite(1);
        assert_eq!(both.get(0, 0), Some(1));
        assert_eq!(both.get(1, 0), Some(5));
        assert_eq!(manager.composite(99), both);
        assert_eq!(manager.total_pixel_count(), 3);
    }

    #[test]
    fn test_from_parts() {
        assert!(FrameManager::from_parts(Vec::new(), 0).is_none());
        let manager = FrameManager::from_parts(vec![Frame::new("a"), Frame::new("b")], 5)
            .expect("non-empty");
        assert_eq!(manager.active_index(), 1);
    }

    #[test]
    fn test_remaining_strength() {
        assert_eq!(remaining_strength(100, 10, 25), 65);
        assert_eq!(remaining_strength(5, 0, 9), -4);
    }
}
