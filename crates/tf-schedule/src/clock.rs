//! Time source abstraction for the tick scheduler.
//!
//! The scheduler never reads the system clock directly.  Production code uses
//! [`SystemClock`]; tests use [`ManualClock`], whose time only moves when a
//! test (or a simulated slow tick) advances it, so deadline arithmetic can be
//! checked exactly.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// A monotonic time source measured from an arbitrary origin.
pub trait Clock {
    /// Monotonic time since the clock's origin.
    fn now(&self) -> Duration;

    /// Block until `now() >= deadline`.  Returns immediately when the
    /// deadline has already passed.
    fn sleep_until(&self, deadline: Duration);
}

/// Wall-clock implementation backed by [`Instant`].
#[derive(Clone, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
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

    fn sleep_until(&self, deadline: Duration) {
        let now = self.now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
    }
}

/// Virtual clock for deterministic tests.
///
/// Clones share the same time value, so a test can hand one clone to the
/// scheduler and advance time from inside a tick callback to simulate an
/// overrunning step.  `sleep_until` jumps straight to the deadline.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move virtual time forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.nanos.fetch_add(by.as_nanos() as u64, Ordering::SeqCst);
    }

    /// Set virtual time to an absolute value.
    pub fn set(&self, to: Duration) {
        self.nanos.store(to.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }

    fn sleep_until(&self, deadline: Duration) {
        let target = deadline.as_nanos() as u64;
        self.nanos.fetch_max(target, Ordering::SeqCst);
    }
}
