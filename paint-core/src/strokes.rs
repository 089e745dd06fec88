//! Stroke interchange: clipboard JSON, animation diffs and transport payloads.

use serde::{Deserialize, Serialize};

use crate::pixels::INDEX_STRIDE;
use crate::{Color, Frame, PaintResult, PixelStore};

/// Payload submitted between animation frames.
pub const SPACER_PAYLOAD: &str = "000000";

/// Stroke coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrokePoint {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

/// One painted pixel in clipboard form: `{"point":{"x":..,"y":..},"color":..}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrokeRecord {
    /// Position.
    pub point: StrokePoint,
    /// Palette color index.
    pub color: Color,
}

/// One entry of an animation frame diff. `color: null` clears the pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStroke {
    /// Position.
    pub point: StrokePoint,
    /// New color, or `None` when the pixel was erased.
    pub color: Option<Color>,
}

/// Every occupied pixel of `pixels` as a stroke record, in store order.
#[must_use]
pub fn to_strokes(pixels: &PixelStore) -> Vec<StrokeRecord> {
    pixels
        .iter()
        .map(|p| StrokeRecord {
            point: StrokePoint { x: p.x, y: p.y },
            color: p.color,
        })
        .collect()
}

/// Clipboard JSON for a store.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_strokes_json(pixels: &PixelStore) -> PaintResult<String> {
    Ok(serde_json::to_string(&to_strokes(pixels))?)
}

fn stroke_entry(value: &serde_json::Value, size: u32) -> Option<(u32, u32, Option<Color>)> {
    let point = value.get("point")?;
    let x = u32::try_from(point.get("x")?.as_u64()?).ok()?;
    let y = u32::try_from(point.get("y")?.as_u64()?).ok()?;
    if x >= size || y >= size {
        return None;
    }
    let color = Color::try_from(value.get("color")?.as_u64()?).ok()?;
    Some((x, y, Some(color)))
}

/// Parse clipboard text into a store for a `size`×`size` canvas.
///
/// Records are validated one by one and invalid ones skipped, including
/// records outside the canvas. Returns `None` when the text is not a JSON
/// array or no record validates, so a caller never receives a partially
/// decoded store in place of an error.
#[must_use]
pub fn from_strokes_json(text: &str, size: u32) -> Option<PixelStore> {
    let size = size.min(INDEX_STRIDE);
    let parsed: serde_json::Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!("Clipboard text is not JSON: {e}");
            return None;
        }
    };
    let records = parsed.as_array()?;
    let entries: Vec<_> = records
        .iter()
        .filter_map(|record| stroke_entry(record, size))
        .collect();
    if entries.is_empty() {
        return None;
    }
    if entries.len() < records.len() {
        tracing::debug!(
            "Skipped {} invalid stroke records",
            records.len() - entries.len()
        );
    }
    Some(PixelStore::new().set_many(entries))
}

/// Per-frame stroke lists for an animation.
///
/// Frame 0 lists every pixel. Each later frame lists what changed from the
/// frame before it: pixels set or recolored (in that frame's order), then
/// pixels erased (in the previous frame's order) with `color: null`.
#[must_use]
pub fn animation_strokes(frames: &[Frame]) -> Vec<Vec<DiffStroke>> {
    let mut out = Vec::with_capacity(frames.len());
    let mut previous: Option<&PixelStore> = None;
    for frame in frames {
        let current = &frame.pixels;
        let mut diff = Vec::new();
        for p in current.iter() {
            if previous.and_then(|prev| prev.get(p.x, p.y)) != Some(p.color) {
                diff.push(DiffStroke {
                    point: StrokePoint { x: p.x, y: p.y },
                    color: Some(p.color),
                });
            }
        }
        if let Some(prev) = previous {
            for p in prev.iter() {
                if !current.contains(p.x, p.y) {
                    diff.push(DiffStroke {
                        point: StrokePoint { x: p.x, y: p.y },
                        color: None,
                    });
                }
            }
        }
        out.push(diff);
        previous = Some(current);
    }
    out
}

/// Clipboard JSON for an animation.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn animation_strokes_json(frames: &[Frame]) -> PaintResult<String> {
    Ok(serde_json::to_string(&animation_strokes(frames))?)
}

/// Hex payloads to submit, in order.
///
/// With `animation` off only the frame at `active` is sent, and nothing when
/// it is empty. With `animation` on every non-empty frame is sent, each
/// followed by [`SPACER_PAYLOAD`] unless it is the last frame. Empty frames
/// are skipped together with their spacer.
///
/// # Errors
///
/// Returns [`crate::PaintError::CoordinateOutOfRange`] if a sent frame has a
/// pixel beyond coordinate 255.
pub fn transport_payloads(
    frames: &[Frame],
    active: usize,
    animation: bool,
) -> PaintResult<Vec<String>> {
    let mut payloads = Vec::new();
    if !animation {
        if let Some(frame) = frames.get(active) {
            if !frame.pixels.is_empty() {
                payloads.push(frame.pixels.to_hex()?);
            }
        }
        return Ok(payloads);
    }
    let last = frames.len().saturating_sub(1);
    for (i, frame) in frames.iter().enumerate() {
        if frame.pixels.is_empty() {
            continue;
        }
        payloads.push(frame.pixels.to_hex()?);
        if i < last {
            payloads.push(SPACER_PAYLOAD.to_string());
        }
    }
    Ok(payloads)
}

/// The store's hex payload with a `0x` prefix, for copying.
///
/// # Errors
///
/// Same as [`PixelStore::to_hex`].
pub fn hex_clipboard_text(pixels: &PixelStore) -> PaintResult<String> {
    Ok(format!("0x{}", pixels.to_hex()?))
}

/// Drop a leading `0x`/`0X` and surrounding whitespace.
#[must_use]
pub fn strip_hex_prefix(text: &str) -> &str {
    let text = text.trim();
    text.strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(pixels: PixelStore) -> Frame {
        Frame {
            pixels,
            ..Frame::new("f")
        }
    }

    #[test]
    fn test_to_strokes_json_shape() {
        let store = PixelStore::new().set(3, 4, Some(5));
        let json = to_strokes_json(&store).expect("json");
        assert_eq!(json, r#"[{"point":{"x":3,"y":4},"color":5}]"#);
    }

    #[test]
    fn test_paste_round_trip() {
        let store = PixelStore::new().set_many([(1, 2, Some(3)), (4, 5, Some(6))]);
        let json = to_strokes_json(&store).expect("json");
        assert_eq!(from_strokes_json(&json, 256), Some(store));
    }

    #[test]
    fn test_paste_rejects_non_array() {
        assert_eq!(from_strokes_json(r#"{"point":{"x":1,"y":1},"color":1}"#, 256), None);
        assert_eq!(from_strokes_json("not json", 256), None);
        assert_eq!(from_strokes_json("[]", 256), None);
    }

    #[test]
    fn test_paste_skips_invalid_records() {
        let text = r#"[
            {"point":{"x":1,"y":1},"color":2},
            {"point":{"x":"a","y":1},"color":2},
            {"point":{"x":1},"color":2},
            {"color":2},
            {"point":{"x":2,"y":2},"color":999}
        ]"#;
        let store = from_strokes_json(text, 256).expect("one valid record");
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(1, 1), Some(2));
    }

    #[test]
    fn test_paste_with_no_valid_records() {
        assert_eq!(from_strokes_json(r#"[{"point":{"x":-1,"y":0},"color":1}]"#, 256), None);
    }

    #[test]
    fn test_paste_drops_records_outside_canvas() {
        let text = r#"[
            {"point":{"x":300,"y":0},"color":1},
            {"point":{"x":0,"y":20000},"color":1},
            {"point":{"x":15,"y":15},"color":4}
        ]"#;
        let store = from_strokes_json(text, 16).expect("one in-canvas record");
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(15, 15), Some(4));

        assert_eq!(from_strokes_json(r#"[{"point":{"x":300,"y":0},"color":1}]"#, 256), None);
        assert_eq!(from_strokes_json(r#"[{"point":{"x":20000,"y":0},"color":1}]"#, 50_000), None);
    }

    #[test]
    fn test_animation_diff() {
        let first = PixelStore::new().set_many([(0, 0, Some(1)), (1, 0, Some(1)), (2, 0, Some(1))]);
        let second = PixelStore::new().set_many([(0, 0, Some(1)), (1, 0, Some(7)), (5, 5, Some(2))]);
        let strokes = animation_strokes(&[frame(first), frame(second)]);

        assert_eq!(strokes.len(), 2);
        assert_eq!(strokes[0].len(), 3);
        let changes: Vec<_> = strokes[1]
            .iter()
            .map(|s| (s.point.x, s.point.y, s.color))
            .collect();
        assert_eq!(changes, vec![(1, 0, Some(7)), (5, 5, Some(2)), (2, 0, None)]);
    }

    #[test]
    fn test_animation_json_uses_null_for_erased() {
        let first = PixelStore::new().set(0, 0, Some(1));
        let json = animation_strokes_json(&[frame(first), frame(PixelStore::new())]).expect("json");
        assert_eq!(
            json,
            r#"[[{"point":{"x":0,"y":0},"color":1}],[{"point":{"x":0,"y":0},"color":null}]]"#
        );
    }

    #[test]
    fn test_transport_single_mode() {
        let frames = vec![
            frame(PixelStore::new().set(1, 1, Some(1))),
            frame(PixelStore::new()),
        ];
        assert_eq!(transport_payloads(&frames, 0, false).expect("payloads"), vec!["010101"]);
        assert!(transport_payloads(&frames, 1, false).expect("payloads").is_empty());
    }

    #[test]
    fn test_transport_animation_mode_spacers() {
        let frames = vec![
            frame(PixelStore::new().set(1, 1, Some(1))),
            frame(PixelStore::new()),
            frame(PixelStore::new().set(2, 2, Some(2))),
            frame(PixelStore::new().set(3, 3, Some(3))),
        ];
        assert_eq!(
            transport_payloads(&frames, 0, true).expect("payloads"),
            vec!["010101", "000000", "020202", "000000", "030303"]
        );
    }

    #[test]
    fn test_transport_animation_trailing_empty_frame() {
        let frames = vec![frame(PixelStore::new().set(1, 1, Some(1))), frame(PixelStore::new())];
        assert_eq!(
            transport_payloads(&frames, 0, true).expect("payloads"),
            vec!["010101", "000000"]
        );
    }

    #[test]
    fn test_hex_clipboard() {
        let store = PixelStore::new().set(16, 1, Some(2));
        let text = hex_clipboard_text(&store).expect("hex");
        assert_eq!(text, "0x100102");
        assert_eq!(strip_hex_prefix(&text), "100102");
        assert_eq!(strip_hex_prefix(" 100102\n"), "100102");
    }
}
