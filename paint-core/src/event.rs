//! Editing intents for the canvas state machine.

use serde::{Deserialize, Serialize};

use crate::{Color, PixelStore};

/// A canvas coordinate as reported by pointer input.
///
/// Signed so that positions left of or above the canvas can be represented
/// (and then rejected as out of bounds).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Unsigned coordinates if the point lies inside a `size × size` canvas.
    #[must_use]
    pub fn in_bounds(self, size: u32) -> Option<(u32, u32)> {
        let x = u32::try_from(self.x).ok()?;
        let y = u32::try_from(self.y).ok()?;
        (x < size && y < size).then_some((x, y))
    }
}

/// Drawing tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tool {
    /// Paint with the current color.
    #[default]
    Pencil,
    /// Clear pixels.
    Eraser,
    /// Flood fill a same-colored region.
    Bucket,
    /// Rectangle or ellipse between press and release.
    Shape,
    /// Drag the whole artwork.
    MoveArt,
}

/// Shape drawn by [`Tool::Shape`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Filled axis-aligned rectangle.
    #[default]
    Rectangle,
    /// Filled ellipse inscribed in the bounding box.
    Ellipse,
}

/// All intents the editor can receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum EditAction {
    /// Choose the active palette color.
    Pick(Color),
    /// Switch tool (cancels any gesture in progress).
    SetTool(Tool),
    /// Choose the shape drawn by the shape tool.
    SetShape(ShapeKind),
    /// Brush diameter, clamped to 1..=10.
    SetBrushSize(u32),
    /// Pointer pressed.
    PointerDown(Point),
    /// Pointer moved (only meaningful while pressed).
    PointerMove(Point),
    /// Pointer released, with the release position when known.
    PointerUp(Option<Point>),
    /// Pointer left the canvas.
    PointerLeave,
    /// Flood fill from a point with the current color.
    FloodFill(Point),
    /// Increase zoom by one step.
    ZoomIn,
    /// Decrease zoom by one step.
    ZoomOut,
    /// Set zoom, clamped to 1..=20.
    SetZoom(u32),
    /// Clear the canvas (one undo step).
    Reset,
    /// Show or hide the pixel grid.
    ToggleGrid,
    /// Foreground opacity, clamped to 10..=100.
    SetOpacity(u8),
    /// Background opacity, clamped to 0..=100.
    SetBackgroundOpacity(u8),
    /// Replace the working store, clearing history.
    #[serde(skip)]
    LoadPixels(PixelStore),
    /// Step back in history.
    Undo,
    /// Step forward in history.
    Redo,
}

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeyModifiers {
    /// Shift key pressed.
    pub shift: bool,
    /// Control key pressed.
    pub ctrl: bool,
    /// Alt/Option key pressed.
    pub alt: bool,
    /// Meta/Command key pressed.
    pub meta: bool,
}

/// Editor commands reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Ctrl/Cmd+Z.
    Undo,
    /// Ctrl/Cmd+Shift+Z or Ctrl/Cmd+Y.
    Redo,
    /// Ctrl/Cmd+V: paste strokes from the clipboard.
    Paste,
}

impl Shortcut {
    /// Map a key press to a shortcut.
    #[must_use]
    pub fn from_key(key: &str, modifiers: KeyModifiers) -> Option<Self> {
        if !(modifiers.ctrl || modifiers.meta) {
            return None;
        }
        match key.to_ascii_lowercase().as_str() {
            "z" if modifiers.shift => Some(Self::Redo),
            "z" => Some(Self::Undo),
            "y" => Some(Self::Redo),
            "v" => Some(Self::Paste),
            _ => None,
        }
    }

    /// The editor intent for history shortcuts. Paste needs clipboard text
    /// and has no direct intent.
    #[must_use]
    pub fn action(self) -> Option<EditAction> {
        match self {
            Self::Undo => Some(EditAction::Undo),
            Self::Redo => Some(EditAction::Redo),
            Self::Paste => None,
        }
    }
}
