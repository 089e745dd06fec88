//! Canvas editing state machine.
//!
//! [`EditorState::apply`] interprets one [`EditAction`] synchronously. Drawing
//! input never fails: out-of-bounds coordinates and actions that make no sense
//! in the current pointer phase are ignored.

use serde::{Deserialize, Serialize};

use crate::raster;
use crate::{Color, EditAction, History, PixelStore, Point, ShapeKind, Tool};

/// Default canvas side length in pixels.
pub const DEFAULT_CANVAS_SIZE: u32 = 256;

/// Brush size bounds.
pub const BRUSH_SIZE_RANGE: (u32, u32) = (1, 10);

/// Zoom (screen pixels per canvas pixel) bounds.
pub const ZOOM_RANGE: (u32, u32) = (1, 20);

/// Foreground opacity bounds, in percent.
pub const OPACITY_RANGE: (u8, u8) = (10, 100);

/// Background opacity bounds, in percent.
pub const BACKGROUND_OPACITY_RANGE: (u8, u8) = (0, 100);

const DEFAULT_ZOOM: u32 = 3;

/// What the pointer is currently doing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "phase")]
pub enum PointerPhase {
    /// Not pressed.
    #[default]
    Idle,
    /// Pencil or eraser stroke in progress.
    Stroking {
        /// Last painted coordinate, used to skip repeated samples.
        last: (u32, u32),
    },
    /// Shape being dragged out.
    Shaping {
        /// Press position.
        anchor: (u32, u32),
        /// Current drag position.
        preview: (u32, u32),
    },
    /// Artwork being dragged.
    Moving {
        /// Position the next delta is measured from.
        anchor: (u32, u32),
    },
}

/// The editor: working pixels, tool settings and history.
#[derive(Debug, Clone)]
pub struct EditorState {
    size: u32,
    pixels: PixelStore,
    history: History,
    tool: Tool,
    shape: ShapeKind,
    color: Color,
    brush_size: u32,
    zoom: u32,
    show_grid: bool,
    opacity: u8,
    background_opacity: u8,
    phase: PointerPhase,
    redraw_tick: u64,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_SIZE)
    }
}

impl EditorState {
    /// Create an empty editor for a `size × size` canvas.
    #[must_use]
    pub fn new(size: u32) -> Self {
        Self {
            size,
            pixels: PixelStore::new(),
            history: History::new(),
            tool: Tool::default(),
            shape: ShapeKind::default(),
            color: 0,
            brush_size: BRUSH_SIZE_RANGE.0,
            zoom: DEFAULT_ZOOM,
            show_grid: true,
            opacity: OPACITY_RANGE.1,
            background_opacity: BACKGROUND_OPACITY_RANGE.1,
            phase: PointerPhase::Idle,
            redraw_tick: 0,
        }
    }

    /// Replace the history with one keeping at most `limit` snapshots.
    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history = History::with_limit(limit);
        self
    }

    /// Canvas side length.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// The working pixel store.
    #[must_use]
    pub fn pixels(&self) -> &PixelStore {
        &self.pixels
    }

    /// Undo/redo stacks.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Active tool.
    #[must_use]
    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Shape drawn by the shape tool.
    #[must_use]
    pub fn shape(&self) -> ShapeKind {
        self.shape
    }

    /// Active palette color.
    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Brush diameter.
    #[must_use]
    pub fn brush_size(&self) -> u32 {
        self.brush_size
    }

    /// Zoom level.
    #[must_use]
    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    /// Whether the grid overlay is shown.
    #[must_use]
    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    /// Foreground opacity in percent.
    #[must_use]
    pub fn opacity(&self) -> u8 {
        self.opacity
    }

    /// Background opacity in percent.
    #[must_use]
    pub fn background_opacity(&self) -> u8 {
        self.background_opacity
    }

    /// Current pointer phase.
    #[must_use]
    pub fn phase(&self) -> PointerPhase {
        self.phase
    }

    /// Counter bumped by in-place pixel updates, so renderers can tell the
    /// store changed even though it is the same value.
    #[must_use]
    pub fn redraw_tick(&self) -> u64 {
        self.redraw_tick
    }

    /// Live shape preview as `(anchor, preview, kind)`, if a shape is being
    /// dragged.
    #[must_use]
    pub fn shape_preview(&self) -> Option<((u32, u32), (u32, u32), ShapeKind)> {
        match self.phase {
            PointerPhase::Shaping { anchor, preview } => Some((anchor, preview, self.shape)),
            _ => None,
        }
    }

    /// Process one action. Returns `true` if the working pixels changed.
    pub fn apply(&mut self, action: EditAction) -> bool {
        match action {
            EditAction::Pick(color) => {
                self.color = color;
                false
            }
            EditAction::SetTool(tool) => {
                self.tool = tool;
                self.phase = PointerPhase::Idle;
                false
            }
            EditAction::SetShape(shape) => {
                self.shape = shape;
                false
            }
            EditAction::SetBrushSize(size) => {
                self.brush_size = size.clamp(BRUSH_SIZE_RANGE.0, BRUSH_SIZE_RANGE.1);
                false
            }
            EditAction::PointerDown(at) => self.pointer_down(at),
            EditAction::PointerMove(at) => self.pointer_move(at),
            EditAction::PointerUp(at) => self.pointer_up(at),
            EditAction::PointerLeave => {
                self.phase = PointerPhase::Idle;
                false
            }
            EditAction::FloodFill(at) => self.fill(at),
            EditAction::ZoomIn => {
                self.zoom = (self.zoom + 1).min(ZOOM_RANGE.1);
                false
            }
            EditAction::ZoomOut => {
                self.zoom = self.zoom.saturating_sub(1).max(ZOOM_RANGE.0);
                false
            }
            EditAction::SetZoom(zoom) => {
                self.zoom = zoom.clamp(ZOOM_RANGE.0, ZOOM_RANGE.1);
                false
            }
            EditAction::Reset => {
                self.history.record(&self.pixels);
                self.pixels = PixelStore::new();
                true
            }
            EditAction::ToggleGrid => {
                self.show_grid = !self.show_grid;
                false
            }
            EditAction::SetOpacity(opacity) => {
                self.opacity = opacity.clamp(OPACITY_RANGE.0, OPACITY_RANGE.1);
                false
            }
            EditAction::SetBackgroundOpacity(opacity) => {
                self.background_opacity =
                    opacity.clamp(BACKGROUND_OPACITY_RANGE.0, BACKGROUND_OPACITY_RANGE.1);
                false
            }
            EditAction::LoadPixels(pixels) => {
                self.load_pixels(pixels);
                true
            }
            EditAction::Undo => {
                let changed = self.history.undo(&mut self.pixels);
                if changed {
                    tracing::debug!("Undo ({} steps left)", self.history.undo_len());
                }
                changed
            }
            EditAction::Redo => {
                let changed = self.history.redo(&mut self.pixels);
                if changed {
                    tracing::debug!("Redo ({} steps left)", self.history.redo_len());
                }
                changed
            }
        }
    }

    /// Replace the working pixels wholesale (frame switch, paste).
    ///
    /// This substitutes the editing context, so both history stacks are
    /// cleared and any gesture in progress is dropped.
    pub fn load_pixels(&mut self, pixels: PixelStore) {
        self.pixels = pixels;
        self.history.clear();
        self.phase = PointerPhase::Idle;
    }

    fn uses_brush(&self) -> bool {
        matches!(self.tool, Tool::Pencil | Tool::Eraser)
    }

    /// Color the brush lays down; `None` erases.
    fn brush_paint(&self) -> Option<Color> {
        (self.tool == Tool::Pencil).then_some(self.color)
    }

    fn pointer_down(&mut self, at: Point) -> bool {
        let Some(pos) = at.in_bounds(self.size) else {
            return false;
        };
        if self.uses_brush() {
            let footprint = raster::brush_footprint(
                pos.0,
                pos.1,
                self.brush_size,
                self.brush_paint(),
                self.size,
            );
            self.history.record(&self.pixels);
            self.pixels = self.pixels.set_many(footprint);
            self.phase = PointerPhase::Stroking { last: pos };
            return true;
        }
        match self.tool {
            Tool::Bucket => self.fill(at),
            Tool::Shape => {
                self.phase = PointerPhase::Shaping {
                    anchor: pos,
                    preview: pos,
                };
                false
            }
            Tool::MoveArt => {
                self.phase = PointerPhase::Moving { anchor: pos };
                false
            }
            Tool::Pencil | Tool::Eraser => false,
        }
    }

    fn pointer_move(&mut self, at: Point) -> bool {
        let Some(pos) = at.in_bounds(self.size) else {
            return false;
        };
        match self.phase {
            PointerPhase::Idle => false,
            PointerPhase::Stroking { last } => {
                if last == pos {
                    return false;
                }
                let footprint = raster::brush_footprint(
                    pos.0,
                    pos.1,
                    self.brush_size,
                    self.brush_paint(),
                    self.size,
                );
                // The snapshot for this stroke was taken on press.
                self.pixels.mutate_many(footprint);
                self.phase = PointerPhase::Stroking { last: pos };
                self.redraw_tick += 1;
                true
            }
            PointerPhase::Shaping { anchor, .. } => {
                self.phase = PointerPhase::Shaping {
                    anchor,
                    preview: pos,
                };
                false
            }
            PointerPhase::Moving { anchor } => {
                let dx = i64::from(pos.0) - i64::from(anchor.0);
                let dy = i64::from(pos.1) - i64::from(anchor.1);
                if dx == 0 && dy == 0 {
                    return false;
                }
                // Both deltas are bounded by the canvas size.
                let (Ok(dx), Ok(dy)) = (i32::try_from(dx), i32::try_from(dy)) else {
                    return false;
                };
                self.pixels = self.pixels.translate(dx, dy, self.size);
                self.phase = PointerPhase::Moving { anchor: pos };
                true
            }
        }
    }

    fn pointer_up(&mut self, at: Option<Point>) -> bool {
        let phase = std::mem::take(&mut self.phase);
        let PointerPhase::Shaping { anchor, preview } = phase else {
            return false;
        };
        let Some(at) = at else {
            tracing::debug!("Shape cancelled without a release position");
            return false;
        };
        let end = at.in_bounds(self.size).unwrap_or(preview);
        let entries = raster::shape(self.shape, anchor, end, self.color);
        self.history.record(&self.pixels);
        self.pixels = self.pixels.set_many(entries);
        true
    }

    fn fill(&mut self, at: Point) -> bool {
        let Some((x, y)) = at.in_bounds(self.size) else {
            return false;
        };
        let entries = raster::flood_fill(&self.pixels, x, y, self.color, self.size);
        if entries.is_empty() {
            return false;
        }
        tracing::debug!("Flood fill at ({x}, {y}) covers {} pixels", entries.len());
        self.history.record(&self.pixels);
        self.pixels = self.pixels.set_many(entries);
        true
    }
}
