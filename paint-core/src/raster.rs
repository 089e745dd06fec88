//! Pixel footprints for the drawing tools.
//!
//! Every function returns the updates to apply rather than touching a store,
//! so the state machine decides between the pure and in-place update paths.

use std::collections::{HashSet, VecDeque};

use crate::{Color, PixelStore, PixelUpdate, ShapeKind};

/// Filled disc of diameter `brush_size` centered on `(cx, cy)`.
///
/// A brush of size 1 (or less) covers only the center. Larger brushes cover
/// every offset with `dx² + dy² <= (brush_size / 2)²`, clipped to the canvas.
#[must_use]
pub fn brush_footprint(
    cx: u32,
    cy: u32,
    brush_size: u32,
    color: Option<Color>,
    canvas_size: u32,
) -> Vec<PixelUpdate> {
    if brush_size <= 1 {
        return vec![(cx, cy, color)];
    }
    let radius = f64::from(brush_size) / 2.0;
    let radius_sq = radius * radius;
    // Brush sizes are small, so the offset always fits.
    #[allow(clippy::cast_possible_truncation)]
    let reach = radius.ceil() as i64;
    let mut entries = Vec::new();
    for dx in -reach..=reach {
        for dy in -reach..=reach {
            #[allow(clippy::cast_precision_loss)]
            let dist_sq = (dx * dx + dy * dy) as f64;
            if dist_sq > radius_sq {
                continue;
            }
            let nx = i64::from(cx) + dx;
            let ny = i64::from(cy) + dy;
            if let (Ok(nx), Ok(ny)) = (u32::try_from(nx), u32::try_from(ny)) {
                if nx < canvas_size && ny < canvas_size {
                    entries.push((nx, ny, color));
                }
            }
        }
    }
    entries
}

/// 4-connected region of the same color as `(x, y)`, recolored to `fill`.
///
/// Unset matches unset. Returns an empty list when the start pixel already has
/// the fill color, or lies outside the canvas.
#[must_use]
pub fn flood_fill(
    pixels: &PixelStore,
    x: u32,
    y: u32,
    fill: Color,
    canvas_size: u32,
) -> Vec<PixelUpdate> {
    if x >= canvas_size || y >= canvas_size {
        return Vec::new();
    }
    let target = pixels.get(x, y);
    if target == Some(fill) {
        return Vec::new();
    }

    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([(x, y)]);
    let mut entries = Vec::new();

    while let Some((cx, cy)) = queue.pop_front() {
        if pixels.get(cx, cy) != target || !visited.insert((cx, cy)) {
            continue;
        }
        entries.push((cx, cy, Some(fill)));

        if cx + 1 < canvas_size {
            queue.push_back((cx + 1, cy));
        }
        if cx > 0 {
            queue.push_back((cx - 1, cy));
        }
        if cy + 1 < canvas_size {
            queue.push_back((cx, cy + 1));
        }
        if cy > 0 {
            queue.push_back((cx, cy - 1));
        }
    }
    entries
}

fn bounding_box(start: (u32, u32), end: (u32, u32)) -> (u32, u32, u32, u32) {
    (
        start.0.min(end.0),
        start.0.max(end.0),
        start.1.min(end.1),
        start.1.max(end.1),
    )
}

/// Inclusive filled rectangle spanned by two corners.
#[must_use]
pub fn rectangle(start: (u32, u32), end: (u32, u32), color: Color) -> Vec<PixelUpdate> {
    let (min_x, max_x, min_y, max_y) = bounding_box(start, end);
    let mut entries = Vec::new();
    for x in min_x..=max_x {
        for y in min_y..=max_y {
            entries.push((x, y, Some(color)));
        }
    }
    entries
}

/// Filled ellipse inscribed in the box spanned by two corners.
///
/// A pixel is inside when `((x-cx)/rx)² + ((y-cy)/ry)² <= 1`. If either
/// half-extent is zero the whole box is filled.
#[must_use]
pub fn ellipse(start: (u32, u32), end: (u32, u32), color: Color) -> Vec<PixelUpdate> {
    let (min_x, max_x, min_y, max_y) = bounding_box(start, end);
    let cx = (f64::from(min_x) + f64::from(max_x)) / 2.0;
    let cy = (f64::from(min_y) + f64::from(max_y)) / 2.0;
    let rx = f64::from(max_x - min_x) / 2.0;
    let ry = f64::from(max_y - min_y) / 2.0;
    let degenerate = max_x == min_x || max_y == min_y;

    let mut entries = Vec::new();
    for x in min_x..=max_x {
        for y in min_y..=max_y {
            let inside = degenerate || {
                let dx = (f64::from(x) - cx) / rx;
                let dy = (f64::from(y) - cy) / ry;
                dx * dx + dy * dy <= 1.0
            };
            if inside {
                entries.push((x, y, Some(color)));
            }
        }
    }
    entries
}

/// Pixels for `kind` between two corners.
#[must_use]
pub fn shape(kind: ShapeKind, start: (u32, u32), end: (u32, u32), color: Color) -> Vec<PixelUpdate> {
    match kind {
        ShapeKind::Rectangle => rectangle(start, end, color),
        ShapeKind::Ellipse => ellipse(start, end, color),
    }
}
