//! Time source abstraction and one-shot timers.
//!
//! The channel's two closing-handshake deadlines are armed against an
//! injected [`TimeSource`] and fired by the embedder pumping
//! [`WebSocketChannel::poll_timers`](crate::channel::WebSocketChannel::poll_timers).
//! Production uses [`WallClock`]; tests drive a [`VirtualClock`], where
//! time only advances when explicitly told to, making timeout behavior
//! fully deterministic.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Time source abstraction for getting the current time.
pub trait TimeSource {
    /// Returns the current time.
    fn now(&self) -> Instant;
}

/// Wall clock time source for production use.
#[derive(Debug, Default)]
pub struct WallClock;

impl WallClock {
    /// Creates a new wall clock time source.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TimeSource for WallClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Virtual time source for deterministic tests.
///
/// Reports a fixed epoch plus an explicitly-advanced offset.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use wschannel::time::{TimeSource, VirtualClock};
///
/// let clock = VirtualClock::new();
/// let start = clock.now();
/// clock.advance(Duration::from_secs(1));
/// assert_eq!(clock.now() - start, Duration::from_secs(1));
/// ```
#[derive(Debug)]
pub struct VirtualClock {
    epoch: Instant,
    /// Offset from the epoch in nanoseconds.
    offset_nanos: AtomicU64,
}

impl VirtualClock {
    /// Creates a virtual clock starting at offset zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            offset_nanos: AtomicU64::new(0),
        }
    }

    /// Advances time by the given duration.
    pub fn advance(&self, by: Duration) {
        self.offset_nanos
            .fetch_add(u64::try_from(by.as_nanos()).unwrap_or(u64::MAX), Ordering::Release);
    }
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for VirtualClock {
    fn now(&self) -> Instant {
        let nanos = self.offset_nanos.load(Ordering::Acquire);
        self.epoch + Duration::from_nanos(nanos)
    }
}

/// A one-shot deadline.
///
/// Armed with an absolute deadline, canceled when its condition occurs
/// first, never restarted after cancellation. Expiry is observed by
/// polling, not by callback.
#[derive(Debug, Default)]
pub struct OneShotTimer {
    deadline: Option<Instant>,
}

impl OneShotTimer {
    /// Creates an unarmed timer.
    #[must_use]
    pub fn new() -> Self {
        Self { deadline: None }
    }

    /// Arms the timer to expire `after` from `now`, replacing any previous
    /// deadline.
    pub fn arm(&mut self, clock: &dyn TimeSource, after: Duration) {
        self.deadline = Some(clock.now() + after);
    }

    /// Disarms the timer.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Returns true while a deadline is armed.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// The armed deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true if the armed deadline has passed.
    #[must_use]
    pub fn is_expired(&self, clock: &dyn TimeSource) -> bool {
        self.deadline.is_some_and(|deadline| clock.now() >= deadline)
    }
}

/// Convenience alias for a shared time source.
pub type SharedTimeSource = Arc<dyn TimeSource>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_clock_starts_at_zero_offset() {
        let clock = VirtualClock::new();
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn virtual_clock_advances_explicitly() {
        let clock = VirtualClock::new();
        let start = clock.now();
        clock.advance(Duration::from_millis(250));
        assert_eq!(clock.now() - start, Duration::from_millis(250));
        clock.advance(Duration::from_millis(750));
        assert_eq!(clock.now() - start, Duration::from_secs(1));
    }

    #[test]
    fn timer_unarmed_never_expires() {
        let clock = VirtualClock::new();
        let timer = OneShotTimer::new();
        assert!(!timer.is_armed());
        assert!(!timer.is_expired(&clock));
    }

    #[test]
    fn timer_expires_at_deadline() {
        let clock = VirtualClock::new();
        let mut timer = OneShotTimer::new();
        timer.arm(&clock, Duration::from_secs(5));
        assert!(timer.is_armed());
        assert!(!timer.is_expired(&clock));

        clock.advance(Duration::from_secs(4));
        assert!(!timer.is_expired(&clock));

        clock.advance(Duration::from_secs(1));
        assert!(timer.is_expired(&clock));
    }

    #[test]
    fn canceled_timer_does_not_fire() {
        let clock = VirtualClock::new();
        let mut timer = OneShotTimer::new();
        timer.arm(&clock, Duration::from_secs(1));
        timer.cancel();
        clock.advance(Duration::from_secs(2));
        assert!(!timer.is_armed());
        assert!(!timer.is_expired(&clock));
    }

    #[test]
    fn rearm_replaces_deadline() {
        let clock = VirtualClock::new();
        let mut timer = OneShotTimer::new();
        timer.arm(&clock, Duration::from_secs(1));
        timer.arm(&clock, Duration::from_secs(10));
        clock.advance(Duration::from_secs(2));
        assert!(!timer.is_expired(&clock));
        clock.advance(Duration::from_secs(8));
        assert!(timer.is_expired(&clock));
    }

    #[test]
    fn wall_clock_moves_forward() {
        let clock = WallClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
