//! Update scheduling for scroll notifications.
//!
//! Scroll events arrive far more often than rebuilds are worth doing. [`Throttle`]
//! implements leading + trailing throttling over caller-supplied instants:
//!
//! - the first event of a burst fires immediately;
//! - further events inside the interval are coalesced into one trailing execution,
//!   due at `last_fire + interval`;
//! - the event loop sleeps until [`Throttle::next_deadline`] and then calls
//!   [`Throttle::poll`].
//!
//! Time is injected, so the throttle is deterministic in tests and never spawns a
//! timer of its own.

use std::time::{Duration, Instant};

/// Default scroll throttle interval.
pub const DEFAULT_SCROLL_THROTTLE: Duration = Duration::from_millis(150);

/// Leading + trailing throttle.
///
/// # Thread Safety
///
/// Not shared; each instance owns its throttle and drives it from its event loop.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last_fire: Option<Instant>,
    pending: bool,
}

impl Throttle {
    /// Create a throttle allowing one execution per `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fire: None,
            pending: false,
        }
    }

    /// Configured interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Register an event at `now`.
    ///
    /// Returns `true` if the caller should execute immediately. Otherwise the event is
    /// coalesced into the pending trailing execution.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::{Duration, Instant};
    /// use virtual_content::engine::Throttle;
    ///
    /// let mut throttle = Throttle::new(Duration::from_millis(100));
    /// let t0 = Instant::now();
    ///
    /// assert!(throttle.on_event(t0));
    /// assert!(!throttle.on_event(t0 + Duration::from_millis(10)));
    /// assert!(!throttle.on_event(t0 + Duration::from_millis(20)));
    /// assert_eq!(throttle.next_deadline(), Some(t0 + Duration::from_millis(100)));
    ///
    /// assert!(!throttle.poll(t0 + Duration::from_millis(99)));
    /// assert!(throttle.poll(t0 + Duration::from_millis(100)));
    /// assert!(!throttle.poll(t0 + Duration::from_millis(300)));
    /// ```
    pub fn on_event(&mut self, now: Instant) -> bool {
        match self.last_fire {
            Some(last) if now.saturating_duration_since(last) < self.interval => {
                self.pending = true;
                false
            }
            _ => {
                self.last_fire = Some(now);
                self.pending = false;
                true
            }
        }
    }

    /// Returns `true` (once) when a trailing execution is due at `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_deadline() {
            Some(deadline) if now >= deadline => {
                self.pending = false;
                self.last_fire = Some(now);
                true
            }
            _ => false,
        }
    }

    /// When the pending trailing execution is due, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        if !self.pending {
            return None;
        }
        self.last_fire.map(|last| last + self.interval)
    }

    /// Whether a trailing execution is pending.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Drop any pending trailing execution.
    pub fn cancel(&mut self) {
        self.pending = false;
    }

    /// Forget all history, including the last execution time.
    pub fn reset(&mut self) {
        self.pending = false;
        self.last_fire = None;
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLL_THROTTLE)
    }
}

/// Result of one permitted update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Pointer resolved from the scroll position.
    pub pointer: usize,
    /// The container width differed from the last stored width.
    pub width_changed: bool,
    /// The materializer ran.
    pub rebuilt: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn first_event_fires_immediately() {
        let mut throttle = Throttle::new(ms(100));
        assert!(throttle.on_event(Instant::now()));
        assert!(!throttle.is_pending());
    }

    #[test]
    fn burst_coalesces_into_one_trailing_call() {
        let mut throttle = Throttle::new(ms(100));
        let t0 = Instant::now();

        assert!(throttle.on_event(t0));
        for step in 1..10 {
            assert!(!throttle.on_event(t0 + ms(step * 5)));
        }
        assert!(throttle.is_pending());

        assert!(throttle.poll(t0 + ms(100)));
        assert!(!throttle.poll(t0 + ms(101)));
        assert!(!throttle.is_pending());
    }

    #[test]
    fn poll_without_pending_does_nothing() {
        let mut throttle = Throttle::new(ms(100));
        let t0 = Instant::now();
        assert!(throttle.on_event(t0));
        assert!(!throttle.poll(t0 + ms(500)));
        assert_eq!(throttle.next_deadline(), None);
    }

    #[test]
    fn event_after_interval_fires_as_new_leading_edge() {
        let mut throttle = Throttle::new(ms(100));
        let t0 = Instant::now();

        assert!(throttle.on_event(t0));
        assert!(!throttle.on_event(t0 + ms(50)));
        // Trailing call was never polled; the next event past the interval fires and
        // absorbs it.
        assert!(throttle.on_event(t0 + ms(150)));
        assert!(!throttle.is_pending());
    }

    #[test]
    fn trailing_call_restarts_the_interval() {
        let mut throttle = Throttle::new(ms(100));
        let t0 = Instant::now();

        assert!(throttle.on_event(t0));
        assert!(!throttle.on_event(t0 + ms(10)));
        assert!(throttle.poll(t0 + ms(100)));
        assert!(!throttle.on_event(t0 + ms(150)));
        assert_eq!(throttle.next_deadline(), Some(t0 + ms(200)));
    }

    #[test]
    fn cancel_drops_trailing_call() {
        let mut throttle = Throttle::new(ms(100));
        let t0 = Instant::now();
        throttle.on_event(t0);
        throttle.on_event(t0 + ms(10));

        throttle.cancel();
        assert!(!throttle.poll(t0 + ms(200)));
    }

    #[test]
    fn zero_interval_fires_every_event() {
        let mut throttle = Throttle::new(Duration::ZERO);
        let t0 = Instant::now();
        assert!(throttle.on_event(t0));
        assert!(throttle.on_event(t0));
        assert!(throttle.on_event(t0 + ms(1)));
    }

    #[test]
    fn reset_forgets_last_fire() {
        let mut throttle = Throttle::new(ms(100));
        let t0 = Instant::now();
        throttle.on_event(t0);
        throttle.reset();
        assert!(throttle.on_event(t0 + ms(1)));
    }
}
