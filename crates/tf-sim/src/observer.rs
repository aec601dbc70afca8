//! Simulation observer trait for diagnostics and the publish boundary.

use tf_agent::{Agent, DeltaBatch};
use tf_core::Tick;

use crate::TickStats;

/// Callbacks invoked by [`Sim::step`][crate::Sim::step] at key points in the
/// tick.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, stats: &TickStats) {
///         if stats.tick.0 % self.interval == 0 {
///             println!("tick {}: {} agents", stats.tick, stats.agents);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once per tick with a non-empty delta batch.  This is the
    /// outbound network boundary.
    fn on_publish(&mut self, _batch: &DeltaBatch) {}

    /// Called for each agent that died this tick, after it left the
    /// directory.
    fn on_death(&mut self, _tick: Tick, _agent: &Agent) {}

    /// Called at the end of each tick.
    fn on_tick_end(&mut self, _stats: &TickStats) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
