//! The `Agent` entity and the small capability traits around it.
//!
//! All mutation goes through setters so the dirty-field set stays exact: a
//! setter that does not change the value does not mark the field.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use tf_core::{EntityId, PhysicsHandle, TargetType, Vec2};

use crate::{AgentField, AgentTemplate, DirtyFields};

// ── AnimationState ────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationState {
    #[default]
    Idle,
    Moving,
    Attacking,
    Casting,
    Dead,
}

// ── Targeting references ──────────────────────────────────────────────────────

/// Resolves the *current* position of any targetable entity.
///
/// Implemented by whatever owns live state (the directory for agents, the
/// simulation world for players and structures).  Returns `None` once the
/// entity no longer exists.
pub trait PositionSource {
    fn position_of(&self, id: EntityId, target_type: TargetType) -> Option<Vec2>;
}

/// A reference to an agent's current target.
///
/// Carries no position.  Every read goes through a [`PositionSource`], so a
/// moved or despawned target is never seen at a stale location.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct TargetRef {
    pub id:          EntityId,
    pub target_type: TargetType,
    /// Effective priority at the time the target was chosen.
    pub priority:    f32,
}

impl TargetRef {
    pub fn new(id: EntityId, target_type: TargetType, priority: f32) -> Self {
        Self { id, target_type, priority }
    }

    /// Live position of the target, `None` if it is gone.
    #[inline]
    pub fn position<P: PositionSource + ?Sized>(&self, source: &P) -> Option<Vec2> {
        source.position_of(self.id, self.target_type)
    }
}

// ── Capabilities ──────────────────────────────────────────────────────────────

/// Anything that can receive damage.
pub trait Damageable {
    /// Apply `amount` raw damage from `source`.  Returns the damage actually
    /// dealt after mitigation.
    fn take_damage(&mut self, amount: f32, source: Option<EntityId>) -> f32;

    fn health(&self) -> f32;

    fn max_health(&self) -> f32;

    fn health_fraction(&self) -> f32 {
        let max = self.max_health();
        if max <= 0.0 { 0.0 } else { (self.health() / max).clamp(0.0, 1.0) }
    }

    fn is_alive(&self) -> bool {
        self.health() > 0.0
    }
}

/// Optional damage-mitigation capability attached to an agent.
pub trait ArmorProvider: fmt::Debug + Send + Sync {
    fn mitigate(&self, raw: f32) -> f32;
}

/// Subtracts a flat amount from every hit, never below zero.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FlatArmor(pub f32);

impl ArmorProvider for FlatArmor {
    fn mitigate(&self, raw: f32) -> f32 {
        (raw - self.0).max(0.0)
    }
}

// ── Agent ─────────────────────────────────────────────────────────────────────

/// A simulated non-player agent.
#[derive(Debug)]
pub struct Agent {
    id:         EntityId,
    handle:     PhysicsHandle,
    template:   Arc<AgentTemplate>,
    level:      u32,
    health:     f32,
    max_health: f32,
    position:   Vec2,
    velocity:   Vec2,
    target:     Option<TargetRef>,
    animation:  AnimationState,
    /// Phase offset for staggered cadences.
    stagger:    u64,
    armor:      Option<Arc<dyn ArmorProvider>>,
    dirty:      DirtyFields,
}

impl Agent {
    /// Create an agent at full (level-scaled) health.
    ///
    /// Every field starts dirty so the first delta after spawn carries the
    /// whole state.  A template with `armor > 0` gets a [`FlatArmor`].
    pub fn new(
        id:       EntityId,
        handle:   PhysicsHandle,
        template: Arc<AgentTemplate>,
        level:    u32,
        position: Vec2,
    ) -> Self {
        let level = level.max(1);
        let max_health = template.scaled_health(level);
        let armor = (template.armor > 0.0)
            .then(|| Arc::new(FlatArmor(template.armor)) as Arc<dyn ArmorProvider>);
        Self {
            id,
            handle,
            template,
            level,
            health: max_health,
            max_health,
            position,
            velocity: Vec2::ZERO,
            target: None,
            animation: AnimationState::Idle,
            stagger: id.0 as u64,
            armor,
            dirty: AgentField::ALL.into_iter().collect(),
        }
    }

    /// Replace the armor capability (or remove it with `None`).
    pub fn with_armor(mut self, armor: Option<Arc<dyn ArmorProvider>>) -> Self {
        self.armor = armor;
        self
    }

    // ── Read access ───────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> EntityId {
        self.id
    }

    #[inline]
    pub fn handle(&self) -> PhysicsHandle {
        self.handle
    }

    #[inline]
    pub fn template(&self) -> &Arc<AgentTemplate> {
        &self.template
    }

    pub fn kind(&self) -> &str {
        &self.template.kind
    }

    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    #[inline]
    pub fn target(&self) -> Option<&TargetRef> {
        self.target.as_ref()
    }

    #[inline]
    pub fn animation(&self) -> AnimationState {
        self.animation
    }

    #[inline]
    pub fn stagger(&self) -> u64 {
        self.stagger
    }

    /// Level-scaled damage of the primary attack.
    pub fn attack_damage(&self) -> f32 {
        self.template.scaled_damage(self.level)
    }

    pub fn armor(&self) -> Option<&Arc<dyn ArmorProvider>> {
        self.armor.as_ref()
    }

    #[inline]
    pub fn dirty_fields(&self) -> DirtyFields {
        self.dirty
    }

    // ── Mutating setters ──────────────────────────────────────────────────

    /// Set health, clamped to `[0, max_health]`.
    pub fn set_health(&mut self, health: f32) {
        let health = health.clamp(0.0, self.max_health);
        if health != self.health {
            self.health = health;
            self.dirty.insert(AgentField::Health);
        }
    }

    /// Restore up to `amount` health.  Returns the amount actually healed.
    pub fn heal(&mut self, amount: f32) -> f32 {
        if !self.is_alive() || amount <= 0.0 {
            return 0.0;
        }
        let before = self.health;
        self.set_health(before + amount);
        self.health - before
    }

    pub fn set_position(&mut self, position: Vec2) {
        if position != self.position {
            self.position = position;
            self.dirty.insert(AgentField::Position);
        }
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        if velocity != self.velocity {
            self.velocity = velocity;
            self.dirty.insert(AgentField::Velocity);
        }
    }

    /// Replace the current target, returning the previous one.
    ///
    /// Only a change of target identity marks the field; a refreshed
    /// priority for the same target is not networked.
    pub fn set_target(&mut self, target: Option<TargetRef>) -> Option<TargetRef> {
        let changed = self.target.map(|t| t.id) != target.map(|t| t.id);
        let previous = std::mem::replace(&mut self.target, target);
        if changed {
            self.dirty.insert(AgentField::Target);
        }
        previous
    }

    pub fn set_animation(&mut self, animation: AnimationState) {
        if animation != self.animation {
            self.animation = animation;
            self.dirty.insert(AgentField::Animation);
        }
    }

    /// Change level, rescaling max health and keeping the health fraction.
    pub fn set_level(&mut self, level: u32) {
        let level = level.max(1);
        if level == self.level {
            return;
        }
        let fraction = self.health_fraction();
        self.level = level;
        self.max_health = self.template.scaled_health(level);
        self.dirty.insert(AgentField::Level);
        self.set_health(self.max_health * fraction);
    }

    /// Forget all dirty fields.  Called by the delta encoder.
    pub(crate) fn clear_dirty(&mut self) {
        self.dirty.clear();
    }
}

impl Damageable for Agent {
    fn take_damage(&mut self, amount: f32, source: Option<EntityId>) -> f32 {
        if !self.is_alive() || amount <= 0.0 {
            return 0.0;
        }
        let mitigated = match &self.armor {
            Some(armor) => armor.mitigate(amount),
            None => amount,
        };
        let before = self.health;
        self.set_health(before - mitigated);
        let dealt = before - self.health;
        tracing::trace!(agent = %self.id, ?source, dealt, health = self.health, "damage taken");
        dealt
    }

    #[inline]
    fn health(&self) -> f32 {
        self.health
    }

    #[inline]
    fn max_health(&self) -> f32 {
        self.max_health
    }
}
