//! Agent intents: what a decision phase asks the simulation to do.

use tf_agent::{AnimationState, TargetRef};
use tf_core::{EntityId, TargetType, Vec2};

/// An action requested by one agent's decision pipeline.
///
/// Phases only read state; the simulation applies intents afterwards, in the
/// order they were produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Replace the current target.
    SetTarget(TargetRef),

    ClearTarget,

    /// Impulse on the agent's physics body.
    ApplyImpulse(Vec2),

    /// Zero the body's velocity (hold position).
    Stop,

    /// Deal `damage` to `target`.  Agents take it through `Damageable`;
    /// anything else goes to the external damage collaborator.
    Attack {
        target:      EntityId,
        target_type: TargetType,
        damage:      f32,
    },

    /// Restore the acting agent's health.
    Heal(f32),

    SetAnimation(AnimationState),

    /// Drop the pathfinder's cached route for this agent.
    InvalidatePath,
}
