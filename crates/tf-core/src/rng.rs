//! Seeded random streams.
//!
//! Every agent draws from its own `SmallRng`, seeded from the run seed and
//! the agent's id:
//!
//!   seed = run_seed XOR (entity_id * GOLDEN)
//!
//! so one agent spawning or dying never shifts the draws of another, and a
//! replay with the same seed makes the same wander headings and ability
//! rolls.  World-level randomness (spawn placement) uses a separate
//! [`SimRng`] tree.

use std::f32::consts::TAU;
use std::ops::Range;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::{EntityId, Vec2};

/// Fractional part of the golden ratio in 64 bits.
const GOLDEN: u64 = 0x9e37_79b9_7f4a_7c15;

/// Per-agent stream.  Lives in the agent's decision state.
pub struct AgentRng(SmallRng);

impl AgentRng {
    pub fn new(run_seed: u64, agent: EntityId) -> Self {
        let seed = run_seed ^ (agent.0 as u64).wrapping_mul(GOLDEN);
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    /// Uniform `f32` in `range`.  An empty range yields `range.start`.
    #[inline]
    pub fn gen_range(&mut self, range: Range<f32>) -> f32 {
        uniform(&mut self.0, range)
    }

    /// Symmetric jitter in `[-amount, amount]`.
    #[inline]
    pub fn jitter(&mut self, amount: f32) -> f32 {
        let amount = amount.abs();
        if amount == 0.0 {
            return 0.0;
        }
        self.0.gen_range(-amount..=amount)
    }

    /// `true` with probability `p`, clamped to `[0, 1]`.
    #[inline]
    pub fn chance(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Raw 64-bit draw.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.0.r#gen()
    }
}

/// World-level stream for spawn placement and scheduled scenario content.
/// Owned by whoever drives the scenario; never shared across threads.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Split off an independent stream, e.g. one per spawn wave.
    pub fn child(&mut self, offset: u64) -> SimRng {
        let seed = self.0.r#gen::<u64>() ^ offset.wrapping_mul(GOLDEN);
        SimRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn gen_range(&mut self, range: Range<f32>) -> f32 {
        uniform(&mut self.0, range)
    }

    /// Uniform point on a circle of `radius` around `center`.
    pub fn point_on_ring(&mut self, center: Vec2, radius: f32) -> Vec2 {
        center + Vec2::from_angle(self.gen_range(0.0..TAU)) * radius
    }
}

fn uniform(rng: &mut SmallRng, range: Range<f32>) -> f32 {
    if range.is_empty() { range.start } else { rng.gen_range(range) }
}
