//! Inbound commands from the network boundary.
//!
//! Commands arrive on a crossbeam channel from any thread and are drained on
//! the simulation thread once per tick, after scheduled tasks and before the
//! agent pipeline.  A command that names something missing is logged and
//! dropped.

use tracing::{debug, warn};

use tf_agent::TargetRef;
use tf_behavior::Cooldowns;
use tf_core::{EntityId, TargetType, Tick, Vec2};

use crate::SimEvent;
use crate::world::{ExternalEntity, World};

#[derive(Clone, Debug, PartialEq)]
pub enum InboundCommand {
    /// Insert or refresh a player or structure.
    UpsertExternal(ExternalEntity),
    /// Movement input for an external entity.
    MoveExternal { id: EntityId, position: Vec2 },
    RemoveExternal(EntityId),
    /// Debug: set an agent's target regardless of strategy.
    ForceTarget { agent: EntityId, target: EntityId, target_type: TargetType },
    /// Debug: drop an agent's target.
    ClearTarget { agent: EntityId },
    /// Debug: put the named ability's cooldown back to ready.
    ForceAbility { agent: EntityId, ability: String },
    Spawn { kind: String, level: u32, position: Vec2 },
    Despawn(EntityId),
}

impl InboundCommand {
    /// Apply to `world`.  Returns `false` when the command was dropped.
    pub(crate) fn apply(self, world: &mut World) -> bool {
        match self {
            InboundCommand::UpsertExternal(e) => world.upsert_external(e),
            InboundCommand::MoveExternal { id, position } => {
                if !position.is_finite() {
                    warn!(entity = %id, "dropping non-finite movement input");
                    return false;
                }
                world.move_external(id, position)
            }
            InboundCommand::RemoveExternal(id) => world.remove_external(id).is_some(),
            InboundCommand::ForceTarget { agent, target, target_type } => {
                if target_type == TargetType::Agent && agent == target {
                    warn!(agent = %agent, "force-target names the agent itself");
                    return false;
                }
                let priority = match target_type {
                    TargetType::Agent => world.directory.get(target).map(|a| a.template().base_priority),
                    _ => world
                        .externals
                        .get(&target)
                        .filter(|e| e.target_type == target_type)
                        .map(|e| e.base_priority),
                };
                let (Some(priority), Some(a)) = (priority, world.directory.get_mut(agent)) else {
                    warn!(agent = %agent, target = %target, "force-target names a missing entity");
                    return false;
                };
                let target_ref = TargetRef::new(target, target_type, priority);
                a.set_target(Some(target_ref));
                world.movement.invalidate(agent);
                world.events.push(SimEvent::TargetAcquired { agent, target: target_ref });
                debug!(agent = %agent, target = %target, "target forced");
                true
            }
            InboundCommand::ClearTarget { agent } => {
                let Some(a) = world.directory.get_mut(agent) else {
                    return false;
                };
                if let Some(previous) = a.set_target(None) {
                    world.events.push(SimEvent::TargetLost { agent, target: previous });
                }
                true
            }
            InboundCommand::ForceAbility { agent, ability } => {
                let Some(kind) = world.directory.get(agent).and_then(|a| world.kinds.get(a.kind())) else {
                    return false;
                };
                let Some(index) = kind.abilities.iter().position(|a| a.name() == ability) else {
                    warn!(agent = %agent, ability = %ability, "force-ability names an unequipped ability");
                    return false;
                };
                match world.brains.get_mut(&agent) {
                    Some(brain) => {
                        brain.cooldowns.trigger(Cooldowns::ability_slot(index), Tick::ZERO, 0);
                        true
                    }
                    None => false,
                }
            }
            InboundCommand::Spawn { kind, level, position } => match world.spawn(&kind, level, position) {
                Ok(_) => true,
                Err(err) => {
                    warn!(kind = %kind, %err, "spawn command failed");
                    false
                }
            },
            InboundCommand::Despawn(id) => world.remove_agent(id).is_some(),
        }
    }
}
