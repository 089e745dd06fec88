//! Sparse pixel storage.
//!
//! A [`PixelStore`] maps canvas coordinates to palette color indices. Unset
//! pixels have no entry. The backing map is reference counted so that clones
//! (history snapshots, frame copies) are cheap, and it keeps insertion order so
//! that the hex encoding of an unmodified store is byte-for-byte stable.
//!
//! Two update paths exist with different aliasing contracts:
//!
//! - [`PixelStore::set`] / [`PixelStore::set_many`] return a new store and never
//!   touch `self`.
//! - [`PixelStore::mutate_many`] updates in place. If the backing map is still
//!   shared with another store it is detached first, so a snapshot taken
//!   earlier is never observed to change.

use std::fmt::Write as _;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{PaintError, PaintResult};

/// Palette-relative color index.
pub type Color = u8;

/// A single update: `(x, y, color)`, where `None` clears the pixel.
pub type PixelUpdate = (u32, u32, Option<Color>);

/// Stride of the flattened coordinate index (`x + y * INDEX_STRIDE`).
///
/// Coordinates must be below this value on both axes.
pub const INDEX_STRIDE: u32 = 10_000;

/// Largest coordinate representable in the hex payload.
pub const HEX_COORD_MAX: u32 = 0xff;

/// Characters per pixel in the hex payload (`XXYYCC`).
pub const HEX_PIXEL_LEN: usize = 6;

/// One occupied pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pixel {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
    /// Palette color index.
    pub color: Color,
}

/// Sparse coordinate → color map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelStore {
    storage: Arc<IndexMap<u32, Color>>,
}

fn flat(x: u32, y: u32) -> Option<u32> {
    (x < INDEX_STRIDE && y < INDEX_STRIDE).then(|| x + y * INDEX_STRIDE)
}

fn unflat(index: u32) -> (u32, u32) {
    (index % INDEX_STRIDE, index / INDEX_STRIDE)
}

fn apply_updates<I>(map: &mut IndexMap<u32, Color>, entries: I)
where
    I: IntoIterator<Item = PixelUpdate>,
{
    for (x, y, color) in entries {
        let Some(key) = flat(x, y) else {
            tracing::trace!("Ignoring pixel update outside index space: ({x}, {y})");
            continue;
        };
        match color {
            Some(color) => {
                map.insert(key, color);
            }
            None => {
                map.shift_remove(&key);
            }
        }
    }
}

fn hex_byte(pair: &[u8]) -> Option<u8> {
    let [hi, lo] = pair else {
        return None;
    };
    let hi = char::from(*hi).to_digit(16)?;
    let lo = char::from(*lo).to_digit(16)?;
    u8::try_from(hi * 16 + lo).ok()
}

impl PixelStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Color at `(x, y)`, or `None` if unset.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        flat(x, y).and_then(|key| self.storage.get(&key).copied())
    }

    /// Whether `(x, y)` is set.
    #[must_use]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.get(x, y).is_some()
    }

    /// Number of occupied pixels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Whether no pixel is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Return a new store with `(x, y)` set to `color` (or cleared for `None`).
    #[must_use]
    pub fn set(&self, x: u32, y: u32, color: Option<Color>) -> Self {
        self.set_many([(x, y, color)])
    }

    /// Return a new store with every update applied in order.
    #[must_use]
    pub fn set_many<I>(&self, entries: I) -> Self
    where
        I: IntoIterator<Item = PixelUpdate>,
    {
        let mut map: IndexMap<u32, Color> = (*self.storage).clone();
        apply_updates(&mut map, entries);
        Self {
            storage: Arc::new(map),
        }
    }

    /// Apply every update to this store in place.
    ///
    /// Used for continuous stroke input. Callers must have captured any undo
    /// snapshot before the first call of a stroke.
    pub fn mutate_many<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = PixelUpdate>,
    {
        apply_updates(Arc::make_mut(&mut self.storage), entries);
    }

    /// Whether both stores share the same backing map.
    #[must_use]
    pub fn same_storage(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.storage, &other.storage)
    }

    /// Iterate occupied pixels in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = Pixel> + '_ {
        self.storage.iter().map(|(&index, &color)| {
            let (x, y) = unflat(index);
            Pixel { x, y, color }
        })
    }

    /// Encode as the `XXYYCC` hex payload.
    ///
    /// # Errors
    ///
    /// Returns [`PaintError::CoordinateOutOfRange`] if any pixel lies beyond
    /// coordinate 255.
    pub fn to_hex(&self) -> PaintResult<String> {
        let mut out = String::with_capacity(self.len() * HEX_PIXEL_LEN);
        for Pixel { x, y, color } in self.iter() {
            if x > HEX_COORD_MAX || y > HEX_COORD_MAX {
                return Err(PaintError::CoordinateOutOfRange { x, y });
            }
            let _ = write!(out, "{x:02x}{y:02x}{color:02x}");
        }
        Ok(out)
    }

    /// Decode an `XXYYCC` hex payload.
    ///
    /// A trailing group shorter than six characters is dropped. Groups with
    /// non-hex characters are skipped.
    #[must_use]
    pub fn from_hex(data: &str) -> Self {
        let mut map = IndexMap::with_capacity(data.len() / HEX_PIXEL_LEN);
        for group in data.as_bytes().chunks_exact(HEX_PIXEL_LEN) {
            let decoded = (
                hex_byte(&group[0..2]),
                hex_byte(&group[2..4]),
                hex_byte(&group[4..6]),
            );
            let (Some(x), Some(y), Some(color)) = decoded else {
                tracing::debug!("Skipping malformed hex pixel group");
                continue;
            };
            map.insert(u32::from(x) + u32::from(y) * INDEX_STRIDE, color);
        }
        Self {
            storage: Arc::new(map),
        }
    }

    /// Shift every pixel by `(dx, dy)`, dropping pixels that leave `[0, size)`.
    #[must_use]
    pub fn translate(&self, dx: i32, dy: i32, size: u32) -> Self {
        let size = size.min(INDEX_STRIDE);
        let mut map = IndexMap::with_capacity(self.len());
        for Pixel { x, y, color } in self.iter() {
            let shifted = (
                u32::try_from(i64::from(x) + i64::from(dx)),
                u32::try_from(i64::from(y) + i64::from(dy)),
            );
            let (Ok(nx), Ok(ny)) = shifted else {
                continue;
            };
            if nx < size && ny < size {
                map.insert(nx + ny * INDEX_STRIDE, color);
            }
        }
        Self {
            storage: Arc::new(map),
        }
    }
}

impl FromIterator<Pixel> for PixelStore {
    fn from_iter<T: IntoIterator<Item = Pixel>>(iter: T) -> Self {
        let mut map = IndexMap::new();
        apply_updates(
            &mut map,
            iter.into_iter().map(|p| (p.x, p.y, Some(p.color))),
        );
        Self {
            storage: Arc::new(map),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PixelStore {
        PixelStore::new().set_many([(0, 0, Some(1)), (3, 4, Some(2)), (255, 255, Some(255))])
    }

    #[test]
    fn test_set_is_pure() {
        let store = PixelStore::new();
        let updated = store.set(1, 2, Some(7));
        assert!(store.is_empty());
        assert_eq!(updated.get(1, 2), Some(7));
    }

    #[test]
    fn test_unset_removes_entry() {
        let store = sample().set(3, 4, None);
        assert_eq!(store.get(3, 4), None);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_set_many_empty_is_unchanged() {
        let store = sample();
        let updated = store.set_many([]);
        assert_eq!(updated, store);
        assert_eq!(updated.to_hex().expect("hex"), store.to_hex().expect("hex"));
    }

    #[test]
    fn test_mutate_many_preserves_identity_when_unique() {
        let mut store = sample().set(9, 9, Some(3));
        let ptr = Arc::as_ptr(&store.storage);
        store.mutate_many([(1, 1, Some(4)), (0, 0, None)]);
        assert_eq!(Arc::as_ptr(&store.storage), ptr);
        assert_eq!(store.get(1, 1), Some(4));
        assert_eq!(store.get(0, 0), None);
    }

    #[test]
    fn test_mutate_many_detaches_shared_storage() {
        let mut store = sample();
        let handle = store.clone();
        assert!(store.same_storage(&handle));
        store.mutate_many([(1, 1, Some(4))]);
        assert!(!store.same_storage(&handle));
        assert_eq!(handle.get(1, 1), None);
    }

    #[test]
    fn test_mutate_many_never_changes_snapshot() {
        let mut working = sample();
        let snapshot = working.clone();
        working.mutate_many([(0, 0, None), (8, 8, Some(9))]);
        assert_eq!(snapshot.get(0, 0), Some(1));
        assert_eq!(snapshot.get(8, 8), None);
        assert_eq!(working.get(0, 0), None);
        assert_eq!(working.get(8, 8), Some(9));
    }

    #[test]
    fn test_iteration_is_insertion_ordered_and_restartable() {
        let store = PixelStore::new().set_many([(5, 5, Some(1)), (1, 1, Some(2)), (3, 3, Some(3))]);
        let first: Vec<_> = store.iter().collect();
        let second: Vec<_> = store.iter().collect();
        assert_eq!(first, second);
        assert_eq!(
            first.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>(),
            vec![(5, 5), (1, 1), (3, 3)]
        );
    }

    #[test]
    fn test_overwrite_keeps_position_reinsert_moves_to_end() {
        let store = PixelStore::new().set_many([(1, 0, Some(1)), (2, 0, Some(1))]);
        let overwritten = store.set(1, 0, Some(9));
        assert_eq!(overwritten.to_hex().expect("hex"), "010009020001");

        let reinserted = store.set(1, 0, None).set(1, 0, Some(9));
        assert_eq!(reinserted.to_hex().expect("hex"), "020001010009");
    }

    #[test]
    fn test_to_hex_format() {
        let store = PixelStore::new().set_many([(1, 2, Some(3)), (255, 16, Some(10))]);
        assert_eq!(store.to_hex().expect("hex"), "010203ff100a");
    }

    #[test]
    fn test_to_hex_rejects_large_coordinates() {
        let store = PixelStore::new().set(256, 0, Some(1));
        assert!(matches!(
            store.to_hex(),
            Err(PaintError::CoordinateOutOfRange { x: 256, y: 0 })
        ));
    }

    #[test]
    fn test_from_hex_drops_trailing_partial_group() {
        let store = PixelStore::from_hex("010203ff10");
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(1, 2), Some(3));
    }

    #[test]
    fn test_from_hex_empty() {
        assert!(PixelStore::from_hex("").is_empty());
    }

    #[test]
    fn test_from_hex_skips_non_hex_group() {
        let store = PixelStore::from_hex("zz0203+10101040506");
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(4, 5), Some(6));
    }

    #[test]
    fn test_from_hex_accepts_uppercase() {
        let store = PixelStore::from_hex("0A0B0C");
        assert_eq!(store.get(10, 11), Some(12));
    }

    #[test]
    fn test_translate_drops_out_of_bounds() {
        let store = PixelStore::new().set(0, 0, Some(4));
        assert!(store.translate(-1, -1, 256).is_empty());
        assert!(store.translate(-1, -1, 1).is_empty());
    }

    #[test]
    fn test_translate_shifts_pixels() {
        let store = PixelStore::new().set_many([(0, 0, Some(1)), (9, 9, Some(2))]);
        let moved = store.translate(2, 1, 10);
        assert_eq!(moved.get(2, 1), Some(1));
        assert_eq!(moved.len(), 1);
        assert_eq!(store.get(0, 0), Some(1));
    }

    #[test]
    fn test_updates_outside_index_space_ignored() {
        let store = PixelStore::new().set(INDEX_STRIDE, 0, Some(1));
        assert!(store.is_empty());
        assert_eq!(store.get(INDEX_STRIDE, 0), None);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_hex_round_trip_preserves_every_coordinate(
                pixels in prop::collection::vec((0u32..=255, 0u32..=255, any::<u8>()), 0..64)
            ) {
                let store = PixelStore::new()
                    .set_many(pixels.iter().map(|&(x, y, c)| (x, y, Some(c))));
                let hex = store.to_hex().expect("hex");
                let decoded = PixelStore::from_hex(&hex);
                for &(x, y, _) in &pixels {
                    prop_assert_eq!(decoded.get(x, y), store.get(x, y));
                }
                prop_assert_eq!(decoded.len(), store.len());
                prop_assert_eq!(&decoded, &store);
                prop_assert_eq!(decoded.to_hex().expect("hex"), hex);
            }
        }
    }
}
