//! Simulation time model.
//!
//! # Design
//!
//! Time is represented as a monotonically increasing `Tick` counter.  The
//! mapping to simulated milliseconds is held in `SimClock`:
//!
//!   sim_time_ms = tick * tick_interval_ms
//!
//! Using an integer tick as the canonical time unit means all cadence and
//! task arithmetic is exact (no floating-point drift) and comparisons are O(1).
//! Wall-clock pacing is the scheduler's job (`tf-schedule`); nothing in this
//! module reads the system clock.

use std::fmt;
use std::time::Duration;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
///
/// Stored as `u64`: at 20 ticks/second a u64 lasts ~29 billion years.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`, saturating at zero.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// `true` when a phase with period `every` is due at this tick for an
    /// agent whose stagger offset is `offset`.
    ///
    /// Offsets spread a population across the period so only roughly
    /// `1 / every` of the agents run a given phase on any one tick.
    #[inline]
    pub fn is_due(self, every: u64, offset: u64) -> bool {
        every <= 1 || (self.0.wrapping_add(offset)) % every == 0
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Converts between tick counts and simulated milliseconds.
///
/// `SimClock` is cheap to copy and intentionally holds no heap data.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Nominal length of one tick in milliseconds.
    pub tick_interval_ms: u64,
    /// The current tick, advanced by `SimClock::advance_to()` each iteration.
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(tick_interval_ms: u64) -> Self {
        Self {
            tick_interval_ms,
            current_tick: Tick::ZERO,
        }
    }

    /// Move the clock to `tick`.  Ticks never go backwards; an older tick is
    /// ignored.
    #[inline]
    pub fn advance_to(&mut self, tick: Tick) {
        if tick > self.current_tick {
            self.current_tick = tick;
        }
    }

    /// Simulated milliseconds since tick 0.
    #[inline]
    pub fn elapsed_ms(&self) -> u64 {
        self.current_tick.0 * self.tick_interval_ms
    }

    /// Seconds covered by `ticks` ticks.  The `dt` used for cadence scaling.
    #[inline]
    pub fn secs_for_ticks(&self, ticks: u64) -> f32 {
        (ticks * self.tick_interval_ms) as f32 / 1_000.0
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// How many ticks span `ms` milliseconds (rounds up).
    #[inline]
    pub fn ticks_for_ms(&self, ms: u64) -> u64 {
        ms.div_ceil(self.tick_interval_ms.max(1))
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.elapsed_ms();
        write!(
            f,
            "{} ({}m{:02}.{:03}s)",
            self.current_tick,
            total / 60_000,
            (total / 1_000) % 60,
            total % 1_000
        )
    }
}
