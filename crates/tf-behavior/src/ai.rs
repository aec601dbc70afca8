//! Per-kind AI strategy objects.
//!
//! An [`AiBehavior`] decides *how* an agent kind targets, steers, attacks
//! and animates.  It is shared across every agent of that kind, so anything
//! per-agent (steering caches, RNG, cooldowns) lives in the pipeline's
//! per-agent state, built from [`AiBehavior::steering`] at spawn.

use tf_agent::AnimationState;
use tf_core::TargetType;

use crate::{
    DecisionContext, Intent, Seek, Separation, SteeringBehavior, SteeringComposer, TargetStrategy,
    Wander,
};

/// What the agent did during this decision cycle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Activity {
    pub moving:   bool,
    pub attacked: bool,
    pub cast:     bool,
}

pub trait AiBehavior: Send + Sync {
    fn name(&self) -> &'static str;

    fn strategy(&self) -> TargetStrategy;

    /// Fresh steering state for one agent.
    fn steering(&self) -> SteeringComposer;

    /// Primary attack against the current target.  Only called when the
    /// target is in range and the attack is off cooldown.
    fn attack(&self, ctx: &DecisionContext<'_>) -> Vec<Intent> {
        match ctx.target {
            Some(t) => vec![Intent::Attack {
                target:      t.id,
                target_type: t.target_type,
                damage:      ctx.agent.attack_damage(),
            }],
            None => vec![],
        }
    }

    fn animation(&self, activity: Activity) -> AnimationState {
        if activity.cast {
            AnimationState::Casting
        } else if activity.attacked {
            AnimationState::Attacking
        } else if activity.moving {
            AnimationState::Moving
        } else {
            AnimationState::Idle
        }
    }
}

// ── Built-ins ─────────────────────────────────────────────────────────────────

/// Closes on the nearest player and keeps a little personal space.
#[derive(Copy, Clone, Debug, Default)]
pub struct MeleeAi;

impl AiBehavior for MeleeAi {
    fn name(&self) -> &'static str {
        "melee"
    }

    fn strategy(&self) -> TargetStrategy {
        TargetStrategy::Closest(TargetType::Player)
    }

    fn steering(&self) -> SteeringComposer {
        SteeringComposer::new().with(
            SteeringBehavior::new(Separation { radius: 48.0, strength: 60.0, max_force: 80.0 }, 1.0)
                .throttled(200),
        )
    }
}

/// Picks the most valuable target of any type and attacks from range.
#[derive(Copy, Clone, Debug, Default)]
pub struct RangedAi;

impl AiBehavior for RangedAi {
    fn name(&self) -> &'static str {
        "ranged"
    }

    fn strategy(&self) -> TargetStrategy {
        TargetStrategy::PriorityAny
    }

    fn steering(&self) -> SteeringComposer {
        SteeringComposer::new().with(
            SteeringBehavior::new(Separation { radius: 64.0, strength: 40.0, max_force: 60.0 }, 1.0)
                .throttled(250),
        )
    }

    fn animation(&self, activity: Activity) -> AnimationState {
        if activity.cast || activity.attacked {
            AnimationState::Casting
        } else if activity.moving {
            AnimationState::Moving
        } else {
            AnimationState::Idle
        }
    }
}

/// Loose pack behavior: nearest anything, jittery heading, tight spacing.
#[derive(Copy, Clone, Debug, Default)]
pub struct SwarmAi;

impl AiBehavior for SwarmAi {
    fn name(&self) -> &'static str {
        "swarm"
    }

    fn strategy(&self) -> TargetStrategy {
        TargetStrategy::ClosestAny
    }

    fn steering(&self) -> SteeringComposer {
        SteeringComposer::new()
            .with(
                SteeringBehavior::new(Separation { radius: 32.0, strength: 50.0, max_force: 70.0 }, 2.0)
                    .throttled(100),
            )
            .with(SteeringBehavior::new(Wander::new(0.6, 20.0), 0.5).throttled(300))
            .with(SteeringBehavior::new(Seek { strength: 40.0 }, 1.0))
    }
}
