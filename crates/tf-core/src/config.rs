//! Simulation configuration.
//!
//! Loaded from TOML by the application crate (with the `serde` feature) and
//! passed to the simulation builder.  Every section has a `Default` so a
//! config file only needs to name what it changes.

use std::time::Duration;

use crate::{SimClock, Tick, TfError, TfResult};

/// Per-phase cadences in ticks.  Each agent runs a phase once every `N`
/// ticks, offset by its stagger offset.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CadenceConfig {
    pub movement:     u64,
    pub targeting:    u64,
    pub abilities:    u64,
    pub network_sync: u64,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            movement:     2,
            targeting:    10,
            abilities:    5,
            network_sync: 3,
        }
    }
}

/// Distances (world units) that drive the movement fallback policy when the
/// pathfinder has no path yet.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MovementConfig {
    /// Below this straight-line distance, move directly without a path.
    pub direct_threshold: f32,
    /// Below this distance, move directly if line of sight holds.
    pub line_of_sight_threshold: f32,
    /// Beyond this distance with no path, give up on the target.
    pub give_up_distance: f32,
    /// Multiplier applied to the steering composer output before it is
    /// added to the path force.
    pub steering_weight: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            direct_threshold:        96.0,
            line_of_sight_threshold: 320.0,
            give_up_distance:        1_200.0,
            steering_weight:         1.0,
        }
    }
}

/// Hysteresis and scoring knobs for target selection.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TargetingConfig {
    /// Distance strategies switch only to a candidate at most this fraction
    /// of the current target's distance.
    pub distance_switch_ratio: f32,
    /// Priority strategies switch only to a candidate whose priority is at
    /// least this multiple of the current target's.
    pub priority_switch_ratio: f32,
    /// Priority added to a target at 0 % health (scaled linearly).
    pub health_priority_bonus: f32,
}

impl Default for TargetingConfig {
    fn default() -> Self {
        Self {
            distance_switch_ratio: 0.8,
            priority_switch_ratio: 1.2,
            health_priority_bonus: 50.0,
        }
    }
}

/// Top-level simulation configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Nominal tick length.  Default: 50 ms (20 Hz).
    pub tick_interval_ms: u64,

    /// Stop after this many ticks.  `None` runs until stopped.
    pub total_ticks: Option<u64>,

    /// Master RNG seed.  The same seed always produces identical decisions.
    pub seed: u64,

    /// Wall-clock period of the critical maintenance sweep.
    pub critical_sweep_interval_ms: u64,

    /// Log a warning when the loop falls this many intervals behind.
    pub backlog_warn_ticks: u64,

    pub cadence:   CadenceConfig,
    pub movement:  MovementConfig,
    pub targeting: TargetingConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms:           50,
            total_ticks:                None,
            seed:                       0,
            critical_sweep_interval_ms: 1_000,
            backlog_warn_ticks:         5,
            cadence:                    CadenceConfig::default(),
            movement:                   MovementConfig::default(),
            targeting:                  TargetingConfig::default(),
        }
    }
}

impl SimConfig {
    /// The tick at which the simulation ends, if bounded.
    #[inline]
    pub fn end_tick(&self) -> Option<Tick> {
        self.total_ticks.map(Tick)
    }

    #[inline]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.tick_interval_ms)
    }

    /// Reject values that would stall or divide by zero at runtime.
    pub fn validate(&self) -> TfResult<()> {
        if self.tick_interval_ms == 0 {
            return Err(TfError::Config("tick_interval_ms must be > 0".into()));
        }
        let c = &self.cadence;
        for (name, every) in [
            ("movement", c.movement),
            ("targeting", c.targeting),
            ("abilities", c.abilities),
            ("network_sync", c.network_sync),
        ] {
            if every == 0 {
                return Err(TfError::Config(format!("cadence.{name} must be > 0")));
            }
        }
        let m = &self.movement;
        if !(m.direct_threshold <= m.line_of_sight_threshold
            && m.line_of_sight_threshold <= m.give_up_distance)
        {
            return Err(TfError::Config(
                "movement thresholds must satisfy direct <= line_of_sight <= give_up".into(),
            ));
        }
        let t = &self.targeting;
        if !(0.0..=1.0).contains(&t.distance_switch_ratio) || t.priority_switch_ratio < 1.0 {
            return Err(TfError::Config(
                "targeting ratios: distance in [0, 1], priority >= 1".into(),
            ));
        }
        Ok(())
    }
}
