//! `CriticalSweep`: wall-clock trigger for CRITICAL maintenance tasks.
//!
//! The sweep fires on its own wall-clock period, independent of tick
//! progress, so maintenance keeps running while the tick loop is backlogged.
//! It never executes anything itself: the timer only delivers signals over a
//! channel, and the simulation thread polls it at iteration boundaries.
//! Maintenance therefore never overlaps an in-flight tick and needs no lock
//! around simulation state.

use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver};

pub struct CriticalSweep {
    timer:    Receiver<Instant>,
    interval: Duration,
}

impl CriticalSweep {
    /// Create a sweep that becomes due every `interval` of wall time.
    pub fn new(interval: Duration) -> Self {
        Self {
            timer: channel::tick(interval),
            interval,
        }
    }

    /// A sweep that is never due.  Useful when maintenance is driven purely
    /// by tick-scheduled tasks.
    pub fn disabled() -> Self {
        Self {
            timer:    channel::never(),
            interval: Duration::MAX,
        }
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// `true` if at least one period elapsed since the last poll.  Missed
    /// periods collapse into a single sweep.
    pub fn poll(&self) -> bool {
        self.timer.try_iter().count() > 0
    }
}
