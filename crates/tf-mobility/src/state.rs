//! Per-agent movement state.

use tf_core::{Tick, Vec2};

/// What the movement phase last decided for an agent.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum MovementMode {
    /// No target.
    #[default]
    Idle,
    /// Target within attack range; standing still.
    InRange,
    /// Following a pathfinder waypoint.
    Pathing,
    /// Moving straight at the target without a path.
    Direct,
    /// No path yet and no direct fallback; waiting for the next cadence.
    Holding,
}

/// Movement state for a single agent.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct MovementState {
    pub mode:     MovementMode,
    /// Tick at which `mode` was entered.
    pub since:    Tick,
    /// Last waypoint steered toward (`Pathing` and `Direct` only).
    pub waypoint: Option<Vec2>,
}

impl MovementState {
    #[inline]
    pub fn idle(tick: Tick) -> Self {
        Self { mode: MovementMode::Idle, since: tick, waypoint: None }
    }

    /// Switch to `mode` at `now`.  `since` only moves when the mode changes.
    pub fn enter(&mut self, mode: MovementMode, now: Tick, waypoint: Option<Vec2>) {
        if self.mode != mode {
            self.mode = mode;
            self.since = now;
        }
        self.waypoint = waypoint;
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        matches!(self.mode, MovementMode::Pathing | MovementMode::Direct)
    }

    /// Ticks spent in the current mode at `now`.
    #[inline]
    pub fn ticks_in_mode(&self, now: Tick) -> u64 {
        now.since(self.since)
    }
}
