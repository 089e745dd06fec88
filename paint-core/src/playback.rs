//! Animation preview playback.

use std::time::Duration;

use crate::{Frame, FrameManager, PixelStore};

/// Shortest time a frame stays on screen.
pub const MIN_FRAME_DURATION: Duration = Duration::from_millis(100);

/// How long a frame with `pixel_count` pixels is shown: one millisecond per
/// pixel, at least [`MIN_FRAME_DURATION`].
#[must_use]
pub fn frame_duration(pixel_count: usize) -> Duration {
    let millis = u64::try_from(pixel_count).unwrap_or(u64::MAX);
    Duration::from_millis(millis).max(MIN_FRAME_DURATION)
}

/// Looping frame player.
///
/// At most one advance is pending at any time. Ticking late advances by a
/// single frame and re-arms from the tick time.
#[derive(Debug, Clone)]
pub struct AnimationPlayer {
    durations: Vec<Duration>,
    current: usize,
    next_advance: Option<Duration>,
    dismissed: bool,
}

impl AnimationPlayer {
    /// Start playing `frames` from the first frame at time `now`.
    #[must_use]
    pub fn new(frames: &[Frame], now: Duration) -> Self {
        let durations: Vec<_> = frames.iter().map(|f| frame_duration(f.pixels.len())).collect();
        let next_advance = durations.first().map(|d| now + *d);
        Self {
            durations,
            current: 0,
            next_advance,
            dismissed: false,
        }
    }

    /// Index of the frame on screen.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Number of frames.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.durations.len()
    }

    /// Whether an advance is pending.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.next_advance.is_some()
    }

    /// Whether the preview was closed.
    #[must_use]
    pub fn is_dismissed(&self) -> bool {
        self.dismissed
    }

    /// When the next advance is due.
    #[must_use]
    pub fn next_advance(&self) -> Option<Duration> {
        self.next_advance
    }

    /// Cancel the pending advance.
    pub fn pause(&mut self) {
        self.next_advance = None;
    }

    /// Re-arm the advance for the current frame. Ignored once dismissed.
    pub fn resume(&mut self, now: Duration) {
        if self.dismissed {
            return;
        }
        self.next_advance = self.durations.get(self.current).map(|d| now + *d);
    }

    /// Toggle between playing and paused.
    pub fn toggle(&mut self, now: Duration) {
        if self.is_playing() {
            self.pause();
        } else {
            self.resume(now);
        }
    }

    /// Stop for good.
    pub fn dismiss(&mut self) {
        self.dismissed = true;
        self.next_advance = None;
    }

    /// Advance if due. Returns `true` when the current frame changed.
    pub fn tick(&mut self, now: Duration) -> bool {
        match self.next_advance {
            Some(due) if now >= due => {
                self.current = (self.current + 1) % self.durations.len();
                self.next_advance = Some(now + self.durations[self.current]);
                true
            }
            _ => false,
        }
    }

    /// What the preview shows: `background` with frames `0..=current` on top.
    #[must_use]
    pub fn render(&self, frames: &FrameManager, background: &PixelStore) -> PixelStore {
        let mut out = background.clone();
        let composite = frames.composite(self.current);
        out.mutate_many(composite.iter().map(|p| (p.x, p.y, Some(p.color))));
        out
    }
}
