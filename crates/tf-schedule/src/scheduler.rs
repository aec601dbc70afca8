//! `TickScheduler`: drift-corrected fixed-rate loop.
//!
//! # Deadline model
//!
//! `start()` records an anchor time `T0`.  Iteration `n` (1-based) is due at
//!
//! ```text
//! deadline(n) = T0 + n * interval
//! ```
//!
//! and the loop sleeps until that absolute deadline rather than for a fixed
//! `interval` after the previous step finished.  A slow step therefore only
//! shortens the following sleep; it never shifts every later tick.  When the
//! loop is behind, deadlines are already in the past and iterations run
//! back-to-back until it catches up.  Ticks are never skipped.
//!
//! # Fault containment
//!
//! The per-tick callback runs inside [`tf_core::guard`].  An `Err` or a panic
//! is logged and counted; the next iteration is scheduled as usual.
//!
//! # Stopping
//!
//! [`StopHandle::stop`] sets a flag that is only read at iteration
//! boundaries.  An in-flight step always runs to completion.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tf_core::{Fault, Tick, guard};
use tracing::{debug, error, info, warn};

use crate::{Clock, ScheduleError, ScheduleResult};

// ── TickInfo ─────────────────────────────────────────────────────────────────

/// What the scheduler hands to the per-tick callback.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TickInfo {
    /// The tick being executed (first iteration is tick 1).
    pub tick: Tick,
    /// Absolute deadline this iteration was scheduled for (`T0 + tick * interval`).
    pub deadline: Duration,
    /// The tick wall time says we should be at when the step started.
    /// Greater than `tick` while the loop is backlogged.
    pub wall_tick: Tick,
}

impl TickInfo {
    /// How many ticks the loop is behind wall time.
    #[inline]
    pub fn lag(&self) -> u64 {
        self.wall_tick.since(self.tick)
    }
}

// ── SchedulerStats ────────────────────────────────────────────────────────────

/// Step-duration diagnostics recorded after every iteration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub ticks:     u64,
    /// Iterations whose callback returned an error or panicked.
    pub faults:    u64,
    pub last_step: Duration,
    pub max_step:  Duration,
    /// Iterations that took longer than one interval.
    pub overruns:  u64,
}

// ── StopHandle ────────────────────────────────────────────────────────────────

/// Cloneable, thread-safe request to stop the loop at the next boundary.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ── TickScheduler ─────────────────────────────────────────────────────────────

pub struct TickScheduler<C: Clock> {
    clock:              C,
    interval:           Duration,
    anchor:             Option<Duration>,
    tick:               Tick,
    stop:               StopHandle,
    max_ticks:          Option<u64>,
    backlog_warn_ticks: u64,
    in_backlog:         bool,
    ran:                bool,
    stats:              SchedulerStats,
}

impl<C: Clock> TickScheduler<C> {
    pub fn new(clock: C, interval: Duration) -> ScheduleResult<Self> {
        if interval.is_zero() {
            return Err(ScheduleError::ZeroInterval);
        }
        Ok(Self {
            clock,
            interval,
            anchor: None,
            tick: Tick::ZERO,
            stop: StopHandle::default(),
            max_ticks: None,
            backlog_warn_ticks: 5,
            in_backlog: false,
            ran: false,
            stats: SchedulerStats::default(),
        })
    }

    /// Stop on its own after `n` iterations.
    pub fn with_max_ticks(mut self, n: u64) -> Self {
        self.max_ticks = Some(n);
        self
    }

    /// Warn once the loop falls `ticks` intervals behind wall time.
    pub fn with_backlog_warning(mut self, ticks: u64) -> Self {
        self.backlog_warn_ticks = ticks.max(1);
        self
    }

    /// Record the anchor time `T0`.
    ///
    /// # Errors
    /// [`ScheduleError::AlreadyStarted`] if the anchor is already set.
    pub fn start(&mut self) -> ScheduleResult<()> {
        if self.anchor.is_some() {
            return Err(ScheduleError::AlreadyStarted);
        }
        let t0 = self.clock.now();
        self.anchor = Some(t0);
        info!(interval_ms = self.interval.as_millis() as u64, "tick scheduler started");
        Ok(())
    }

    /// Request a stop; takes effect at the next iteration boundary.
    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    #[inline]
    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[inline]
    pub fn anchor(&self) -> Option<Duration> {
        self.anchor
    }

    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Absolute deadline of `tick`: `T0 + tick * interval`.  `None` before
    /// `start()`.
    pub fn deadline_for(&self, tick: Tick) -> Option<Duration> {
        self.anchor.map(|t0| t0 + scaled(self.interval, tick.0))
    }

    /// The tick wall time corresponds to right now.
    pub fn wall_tick(&self) -> Tick {
        match self.anchor {
            None => Tick::ZERO,
            Some(t0) => {
                let elapsed = self.clock.now().saturating_sub(t0);
                Tick((elapsed.as_nanos() / self.interval.as_nanos()) as u64)
            }
        }
    }

    /// Run iterations until stopped (or `max_ticks` is reached).
    ///
    /// Starts the scheduler if `start()` was not called explicitly.
    ///
    /// # Errors
    /// [`ScheduleError::AlreadyStarted`] when called a second time.
    pub fn run<F>(&mut self, mut on_tick: F) -> ScheduleResult<SchedulerStats>
    where
        F: FnMut(TickInfo) -> Result<(), Fault>,
    {
        if self.ran {
            return Err(ScheduleError::AlreadyStarted);
        }
        self.ran = true;
        if self.anchor.is_none() {
            self.start()?;
        }

        while self.should_continue() {
            let deadline = self.deadline_for(self.tick.offset(1)).unwrap_or_default();
            // Delay is measured from now to the absolute deadline, not a fixed
            // interval from the end of the previous step.
            self.clock.sleep_until(deadline);
            if self.stop.is_stopped() {
                break;
            }
            self.step(deadline, &mut on_tick);
        }

        info!(ticks = self.stats.ticks, faults = self.stats.faults, "tick scheduler stopped");
        Ok(self.stats.clone())
    }

    fn should_continue(&self) -> bool {
        if self.stop.is_stopped() {
            return false;
        }
        match self.max_ticks {
            Some(max) => self.stats.ticks < max,
            None => true,
        }
    }

    fn step<F>(&mut self, deadline: Duration, on_tick: &mut F)
    where
        F: FnMut(TickInfo) -> Result<(), Fault>,
    {
        self.tick = self.tick.offset(1);
        let started = self.clock.now();
        let info = TickInfo {
            tick: self.tick,
            deadline,
            wall_tick: self.wall_tick(),
        };
        self.track_backlog(&info);

        if let Err(fault) = guard(|| on_tick(info)) {
            self.stats.faults += 1;
            error!(tick = %info.tick, %fault, "tick callback failed; loop continues");
        }

        let step = self.clock.now().saturating_sub(started);
        self.stats.ticks += 1;
        self.stats.last_step = step;
        self.stats.max_step = self.stats.max_step.max(step);
        if step > self.interval {
            self.stats.overruns += 1;
            debug!(tick = %info.tick, step_ms = step.as_millis() as u64, "tick overran its interval");
        }
    }

    fn track_backlog(&mut self, info: &TickInfo) {
        let lag = info.lag();
        if lag >= self.backlog_warn_ticks && !self.in_backlog {
            self.in_backlog = true;
            warn!(tick = %info.tick, lag, "tick loop is behind wall time; catching up");
        } else if lag == 0 && self.in_backlog {
            self.in_backlog = false;
            info!(tick = %info.tick, "tick loop caught up");
        }
    }
}

/// `interval * n` without the `u32` limit of `Duration: Mul<u32>`.
fn scaled(interval: Duration, n: u64) -> Duration {
    let nanos = interval.as_nanos().saturating_mul(n as u128);
    Duration::from_nanos(nanos.min(u64::MAX as u128) as u64)
}
