//! Ability strategy objects and per-agent cooldown tracking.
//!
//! An ability is stateless and shared by every agent of a kind; per-agent
//! cooldowns live in [`Cooldowns`].  `execute` may fail with a [`Fault`];
//! the pipeline contains it per ability, so one broken ability never stops
//! the agent's other abilities or its primary attack.

use tf_agent::Damageable;
use tf_core::{AgentRng, Fault, Tick, TargetType};

use crate::{DecisionContext, Intent};

pub trait Ability: Send + Sync {
    fn name(&self) -> &'static str;

    fn cooldown_ticks(&self) -> u64;

    /// Usability predicate, checked only while the ability is off cooldown.
    fn can_use(&self, ctx: &DecisionContext<'_>) -> bool;

    fn execute(&self, ctx: &DecisionContext<'_>, rng: &mut AgentRng) -> Result<Vec<Intent>, Fault>;
}

// ── Cooldowns ─────────────────────────────────────────────────────────────────

/// Ready-at ticks per slot.  Slot 0 is the primary attack; ability `i` uses
/// slot `i + 1`.
#[derive(Clone, Debug, Default)]
pub struct Cooldowns {
    ready_at: Vec<Tick>,
}

impl Cooldowns {
    pub const ATTACK: usize = 0;

    #[inline]
    pub fn ability_slot(index: usize) -> usize {
        index + 1
    }

    pub fn new() -> Self {
        Self::default()
    }

    /// Slots never triggered are ready.
    pub fn is_ready(&self, slot: usize, now: Tick) -> bool {
        self.ready_at.get(slot).is_none_or(|&t| now >= t)
    }

    pub fn trigger(&mut self, slot: usize, now: Tick, cooldown_ticks: u64) {
        if self.ready_at.len() <= slot {
            self.ready_at.resize(slot + 1, Tick::ZERO);
        }
        self.ready_at[slot] = now.offset(cooldown_ticks);
    }

    /// Ticks until `slot` is ready, `0` if it already is.
    pub fn remaining(&self, slot: usize, now: Tick) -> u64 {
        self.ready_at.get(slot).map_or(0, |&t| t.since(now))
    }
}

// ── Built-in abilities ────────────────────────────────────────────────────────

/// Heals a fraction of max health once health drops below a threshold.
#[derive(Copy, Clone, Debug)]
pub struct SelfHeal {
    pub threshold: f32,
    pub fraction:  f32,
    pub cooldown:  u64,
}

impl Default for SelfHeal {
    fn default() -> Self {
        Self { threshold: 0.5, fraction: 0.3, cooldown: 40 }
    }
}

impl Ability for SelfHeal {
    fn name(&self) -> &'static str {
        "self_heal"
    }

    fn cooldown_ticks(&self) -> u64 {
        self.cooldown
    }

    fn can_use(&self, ctx: &DecisionContext<'_>) -> bool {
        ctx.agent.health_fraction() < self.threshold
    }

    fn execute(&self, ctx: &DecisionContext<'_>, _rng: &mut AgentRng) -> Result<Vec<Intent>, Fault> {
        Ok(vec![Intent::Heal(ctx.agent.max_health() * self.fraction)])
    }
}

/// Lunges at a target that is neither too close nor too far.
#[derive(Copy, Clone, Debug)]
pub struct Charge {
    pub min_distance: f32,
    pub max_distance: f32,
    /// Impulse magnitude as a multiple of the template speed.
    pub power:        f32,
    pub cooldown:     u64,
}

impl Default for Charge {
    fn default() -> Self {
        Self { min_distance: 120.0, max_distance: 400.0, power: 2.0, cooldown: 60 }
    }
}

impl Ability for Charge {
    fn name(&self) -> &'static str {
        "charge"
    }

    fn cooldown_ticks(&self) -> u64 {
        self.cooldown
    }

    fn can_use(&self, ctx: &DecisionContext<'_>) -> bool {
        ctx.target_distance()
            .is_some_and(|d| d >= self.min_distance && d <= self.max_distance)
    }

    fn execute(&self, ctx: &DecisionContext<'_>, _rng: &mut AgentRng) -> Result<Vec<Intent>, Fault> {
        let target = ctx.target_position.ok_or_else(|| Fault::failed("charge without a target position"))?;
        let dir = (target - ctx.position()).normalized();
        let impulse = dir * ctx.agent.template().speed * self.power;
        Ok(vec![Intent::InvalidatePath, Intent::ApplyImpulse(impulse)])
    }
}

/// Hits every player within `radius` for a multiple of the agent's damage.
#[derive(Copy, Clone, Debug)]
pub struct Shockwave {
    pub radius:     f32,
    pub multiplier: f32,
    pub cooldown:   u64,
}

impl Default for Shockwave {
    fn default() -> Self {
        Self { radius: 96.0, multiplier: 1.5, cooldown: 80 }
    }
}

impl Shockwave {
    fn victims<'c>(&self, ctx: &'c DecisionContext<'_>) -> impl Iterator<Item = &'c crate::Candidate> + 'c {
        let origin = ctx.position();
        let r2 = self.radius * self.radius;
        ctx.candidates
            .of_type(TargetType::Player)
            .iter()
            .filter(move |c| origin.distance_squared(c.position) <= r2)
    }
}

impl Ability for Shockwave {
    fn name(&self) -> &'static str {
        "shockwave"
    }

    fn cooldown_ticks(&self) -> u64 {
        self.cooldown
    }

    fn can_use(&self, ctx: &DecisionContext<'_>) -> bool {
        self.victims(ctx).next().is_some()
    }

    fn execute(&self, ctx: &DecisionContext<'_>, _rng: &mut AgentRng) -> Result<Vec<Intent>, Fault> {
        let damage = ctx.agent.attack_damage() * self.multiplier;
        Ok(self
            .victims(ctx)
            .map(|c| Intent::Attack { target: c.id, target_type: c.target_type, damage })
            .collect())
    }
}
