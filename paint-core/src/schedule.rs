//! Time source and deferred-work primitives.
//!
//! Nothing here spawns timers. Owners poll with the current time from a
//! [`Clock`], which keeps session behavior deterministic under
//! [`ManualClock`] in tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic time source.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;
}

/// Wall-clock backed [`Clock`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Clock with its origin at the moment of creation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven [`Clock`]. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    /// Clock starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        let millis = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::SeqCst))
    }
}

/// Single restartable deadline.
///
/// Scheduling again before the deadline pushes it back, so a burst of
/// triggers fires once, `delay` after the last one.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Duration>,
}

impl Debouncer {
    /// Debouncer with the given quiet period.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// (Re)arm the deadline at `now + delay`.
    pub fn schedule(&mut self, now: Duration) {
        self.deadline = Some(now + self.delay);
    }

    /// Drop the pending deadline.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Whether a deadline is armed.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// The armed deadline.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Returns `true` and disarms if the deadline has passed.
    pub fn fire_if_due(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Returns `true` and disarms if anything was pending, regardless of time.
    pub fn flush(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}

/// Coalesces redraw requests to at most one per tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedrawRequest {
    pending: bool,
    requested: u64,
    delivered: u64,
}

impl RedrawRequest {
    /// Create with nothing pending.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a redraw. Returns `true` if this request armed a new one.
    pub fn request(&mut self) -> bool {
        self.requested += 1;
        !std::mem::replace(&mut self.pending, true)
    }

    /// Whether a redraw is pending.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending
    }

    /// Consume the pending redraw, if any.
    pub fn take(&mut self) -> bool {
        let pending = std::mem::take(&mut self.pending);
        if pending {
            self.delivered += 1;
        }
        pending
    }

    /// Total requests received.
    #[must_use]
    pub fn requested(&self) -> u64 {
        self.requested
    }

    /// Redraws actually delivered.
    #[must_use]
    pub fn delivered(&self) -> u64 {
        self.delivered
    }
}
