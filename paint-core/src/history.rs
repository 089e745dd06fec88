//! Bounded undo/redo history of pixel snapshots.

use std::collections::VecDeque;

use crate::PixelStore;

/// Default number of undo snapshots kept.
pub const MAX_HISTORY: usize = 50;

/// Undo and redo stacks.
///
/// Snapshots are [`PixelStore`] values; clones share storage until either side
/// is modified, and no update path ever writes through a snapshot.
#[derive(Debug, Clone)]
pub struct History {
    /// Older states, newest at the back.
    past: VecDeque<PixelStore>,
    /// Undone states, next redo at the back.
    future: Vec<PixelStore>,
    /// Maximum number of undo snapshots (oldest dropped when exceeded).
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// Create empty history with the default limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limit(MAX_HISTORY)
    }

    /// Create empty history keeping at most `limit` undo snapshots.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            limit: limit.max(1),
        }
    }

    fn push_past(&mut self, snapshot: PixelStore) {
        if self.past.len() >= self.limit {
            self.past.pop_front();
        }
        self.past.push_back(snapshot);
    }

    /// Record `current` as an undo step before a new edit. Clears redo.
    pub fn record(&mut self, current: &PixelStore) {
        self.push_past(current.clone());
        self.future.clear();
    }

    /// Restore the newest snapshot into `current`.
    ///
    /// Returns `false` (leaving `current` untouched) when there is nothing to
    /// undo.
    pub fn undo(&mut self, current: &mut PixelStore) -> bool {
        let Some(previous) = self.past.pop_back() else {
            return false;
        };
        self.future.push(std::mem::replace(current, previous));
        true
    }

    /// Re-apply the most recently undone state into `current`.
    ///
    /// Returns `false` when there is nothing to redo.
    pub fn redo(&mut self, current: &mut PixelStore) -> bool {
        let Some(next) = self.future.pop() else {
            return false;
        };
        let replaced = std::mem::replace(current, next);
        self.push_past(replaced);
        true
    }

    /// Drop both stacks.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    /// Number of available undo steps.
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.past.len()
    }

    /// Number of available redo steps.
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.future.len()
    }

    /// Whether undo would do anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Whether redo would do anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }
}
