//! The `World`: every piece of mutable simulation state a tick touches.
//!
//! `World` is the context object handed to scheduled tasks and inbound
//! commands.  It replaces any global registry: the physics capability, the
//! pathfinder, the directory and the kind tables are all reached through it.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::{debug, warn};

use tf_agent::{Agent, Damageable, EntityDirectory, PositionSource, TemplateSet};
use tf_behavior::{Candidate, CandidatePool, Cooldowns, KindRegistry, SteeringComposer};
use tf_core::{AgentRng, EntityId, TargetType, Vec2};
use tf_mobility::MovementPlanner;
use tf_spatial::{BodyDesc, Pathfinder, PhysicsWorld, SpatialIndex};

use crate::{SimError, SimEvent, SimResult};

// ── External entities ─────────────────────────────────────────────────────────

/// A targetable object the core does not simulate: a player or a structure.
///
/// Its state is pushed in through inbound commands; damage dealt to it goes
/// out through the [`DamageSink`].
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ExternalEntity {
    pub id:              EntityId,
    pub target_type:     TargetType,
    pub position:        Vec2,
    pub base_priority:   f32,
    pub health_fraction: f32,
}

impl ExternalEntity {
    pub fn player(id: EntityId, position: Vec2) -> Self {
        Self { id, target_type: TargetType::Player, position, base_priority: 10.0, health_fraction: 1.0 }
    }

    pub fn structure(id: EntityId, position: Vec2) -> Self {
        Self { id, target_type: TargetType::Structure, position, base_priority: 5.0, health_fraction: 1.0 }
    }
}

// ── Damage collaborator ───────────────────────────────────────────────────────

/// Receives damage dealt to external entities.  Nothing flows back into the
/// core synchronously.
pub trait DamageSink {
    fn take_damage(&mut self, target: EntityId, target_type: TargetType, amount: f32, source: Option<EntityId>);
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct DamageRecord {
    pub target:      EntityId,
    pub target_type: TargetType,
    pub amount:      f32,
    pub source:      Option<EntityId>,
}

/// A [`DamageSink`] that records every call.  Clones share one record list.
#[derive(Clone, Debug, Default)]
pub struct DamageLedger {
    records: Rc<RefCell<Vec<DamageRecord>>>,
}

impl DamageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<DamageRecord> {
        self.records.borrow().clone()
    }

    /// Total damage dealt to `target`.
    pub fn total_for(&self, target: EntityId) -> f32 {
        self.records.borrow().iter().filter(|r| r.target == target).map(|r| r.amount).sum()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }
}

impl DamageSink for DamageLedger {
    fn take_damage(&mut self, target: EntityId, target_type: TargetType, amount: f32, source: Option<EntityId>) {
        self.records.borrow_mut().push(DamageRecord { target, target_type, amount, source });
    }
}

// ── Per-agent decision state ──────────────────────────────────────────────────

/// Mutable per-agent state owned by the decision pipeline.
pub struct AgentBrain {
    pub steering:  SteeringComposer,
    pub rng:       AgentRng,
    pub cooldowns: Cooldowns,
    /// Whether the last movement phase moved the agent.
    pub moving:    bool,
}

// ── Live position view ────────────────────────────────────────────────────────

/// Borrowed [`PositionSource`] over agents and external entities.
///
/// Holding only the two maps lets the pipeline read live positions while it
/// mutates other parts of the world.
#[derive(Copy, Clone)]
pub struct LivePositions<'a> {
    pub directory: &'a EntityDirectory,
    pub externals: &'a BTreeMap<EntityId, ExternalEntity>,
}

impl PositionSource for LivePositions<'_> {
    fn position_of(&self, id: EntityId, target_type: TargetType) -> Option<Vec2> {
        match target_type {
            TargetType::Agent => self.directory.get(id).map(Agent::position),
            _ => self
                .externals
                .get(&id)
                .filter(|e| e.target_type == target_type)
                .map(|e| e.position),
        }
    }
}

// ── World ─────────────────────────────────────────────────────────────────────

pub struct World {
    pub directory:  EntityDirectory,
    pub physics:    Box<dyn PhysicsWorld>,
    pub movement:   MovementPlanner<Box<dyn Pathfinder>>,
    pub externals:  BTreeMap<EntityId, ExternalEntity>,
    pub templates:  TemplateSet,
    pub kinds:      KindRegistry,
    pub brains:     BTreeMap<EntityId, AgentBrain>,
    pub damage:     Box<dyn DamageSink>,
    pub index:      SpatialIndex,
    pub candidates: CandidatePool,
    /// Whether agents appear in each other's candidate pools.
    pub agents_targetable: bool,
    /// Events raised since the last dispatch.
    pub events:     Vec<SimEvent>,
    /// Agents removed since the last publish.
    pub removed:    Vec<EntityId>,
    /// Linear damping given to new agent bodies.
    pub body_damping: f32,
    next_id:        u32,
    seed:           u64,
}

impl World {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        physics:   Box<dyn PhysicsWorld>,
        movement:  MovementPlanner<Box<dyn Pathfinder>>,
        templates: TemplateSet,
        kinds:     KindRegistry,
        damage:    Box<dyn DamageSink>,
        seed:      u64,
        first_id:  u32,
    ) -> Self {
        Self {
            directory: EntityDirectory::new(),
            physics,
            movement,
            externals: BTreeMap::new(),
            templates,
            kinds,
            brains: BTreeMap::new(),
            damage,
            index: SpatialIndex::new(),
            candidates: CandidatePool::new(),
            agents_targetable: false,
            events: Vec::new(),
            removed: Vec::new(),
            body_damping: BodyDesc::default().linear_damping,
            next_id: first_id,
            seed,
        }
    }

    /// Live position view for target references.
    pub fn positions(&self) -> LivePositions<'_> {
        LivePositions { directory: &self.directory, externals: &self.externals }
    }

    // ── Spawning ──────────────────────────────────────────────────────────

    /// Create an agent of `kind` at `position`.
    ///
    /// # Errors
    /// Unknown kind, or a physics body that could not be created.
    pub fn spawn(&mut self, kind: &str, level: u32, position: Vec2) -> SimResult<EntityId> {
        let template = self.templates.require(kind)?;
        let agent_kind = self.kinds.require(kind)?;
        if !position.is_finite() {
            return Err(SimError::Config(format!("spawn of {kind:?} at non-finite position {position}")));
        }

        let id = self.allocate_id();
        let desc = BodyDesc { linear_damping: self.body_damping, ..BodyDesc::at(position) }
            .with_max_speed(template.speed);
        let handle = self.physics.create_body(desc)?;

        let agent = Agent::new(id, handle, template, level, position);
        if let Err(e) = self.directory.register(agent) {
            self.physics.remove_body(handle);
            return Err(e.into());
        }
        self.brains.insert(id, AgentBrain {
            steering:  agent_kind.ai.steering(),
            rng:       AgentRng::new(self.seed, id),
            cooldowns: Cooldowns::new(),
            moving:    false,
        });
        self.events.push(SimEvent::AgentSpawned { agent: id, kind: kind.to_owned() });
        debug!(agent = %id, kind, level, %position, "agent spawned");
        Ok(id)
    }

    /// Remove an agent and its body.  The id is reported in the next
    /// published batch.  Returns the removed agent.
    pub fn remove_agent(&mut self, id: EntityId) -> Option<Agent> {
        let agent = self.directory.despawn(id)?;
        self.physics.remove_body(agent.handle());
        self.movement.despawn(id);
        self.brains.remove(&id);
        self.removed.push(id);
        Some(agent)
    }

    fn allocate_id(&mut self) -> EntityId {
        loop {
            let id = EntityId(self.next_id);
            self.next_id = self.next_id.wrapping_add(1);
            if !self.externals.contains_key(&id) && !self.directory.contains(id) {
                return id;
            }
        }
    }

    // ── External entities ─────────────────────────────────────────────────

    /// Insert or replace an external entity.  Returns `false` (and changes
    /// nothing) when the id belongs to an agent or the entity claims the
    /// `Agent` type.
    pub fn upsert_external(&mut self, entity: ExternalEntity) -> bool {
        if entity.target_type == TargetType::Agent || self.directory.contains(entity.id) {
            warn!(entity = %entity.id, "external entity rejected: id or type belongs to agents");
            return false;
        }
        self.externals.insert(entity.id, entity);
        true
    }

    pub fn move_external(&mut self, id: EntityId, position: Vec2) -> bool {
        match self.externals.get_mut(&id) {
            Some(e) => {
                e.position = position;
                true
            }
            None => false,
        }
    }

    pub fn remove_external(&mut self, id: EntityId) -> Option<ExternalEntity> {
        self.externals.remove(&id)
    }

    // ── Per-tick derived state ────────────────────────────────────────────

    /// Rebuild the neighbour index and the candidate pool from live state.
    pub(crate) fn rebuild_views(&mut self) {
        self.index.rebuild(self.directory.iter().map(|a| (a.id(), a.position())));

        self.candidates.clear();
        for e in self.externals.values() {
            self.candidates.push(Candidate {
                id:              e.id,
                target_type:     e.target_type,
                position:        e.position,
                base_priority:   e.base_priority,
                health_fraction: e.health_fraction.clamp(0.0, 1.0),
            });
        }
        if self.agents_targetable {
            for a in self.directory.iter() {
                self.candidates.push(Candidate {
                    id:              a.id(),
                    target_type:     TargetType::Agent,
                    position:        a.position(),
                    base_priority:   a.template().base_priority,
                    health_fraction: a.health_fraction(),
                });
            }
        }
    }

    /// Copy body state from the physics capability back into the agents.
    pub(crate) fn sync_from_physics(&mut self) {
        let physics = &self.physics;
        for agent in self.directory.iter_mut() {
            let handle = agent.handle();
            if let Some(p) = physics.translation(handle) {
                agent.set_position(p);
            }
            if let Some(v) = physics.velocity(handle) {
                agent.set_velocity(v);
            }
        }
    }
}
