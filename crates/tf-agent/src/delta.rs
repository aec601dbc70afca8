//! Snapshot and delta encoding for network publication.
//!
//! A full [`AgentSnapshot`] is always available (new-client join).  An
//! [`AgentDelta`] carries the agent id plus only the fields in the dirty set;
//! absent fields are skipped when serialized, so
//! `serde_json::to_string(&delta)` for a health-only change is
//! `{"id":7,"health":42.0}`.
//!
//! A cleared target is encoded as an explicit `"target":null`, distinct from
//! "target unchanged" (field absent).

use serde::{Deserialize, Serialize};

use tf_core::{EntityId, Tick, Vec2};

use crate::{Agent, AgentField, AnimationState, Damageable};

/// Dirty-tracked snapshot/delta serialization.
pub trait NetworkDeltaEncoder {
    type Snapshot: Serialize;
    type Delta: Serialize;

    /// Complete current state.  Does not touch the dirty set.
    fn serialize(&self) -> Self::Snapshot;

    fn is_dirty(&self) -> bool;

    /// Only the changed fields, or `None` when nothing changed.
    fn serialize_delta(&self) -> Option<Self::Delta>;

    /// Forget all changes.  Called exactly once per publish cycle; a no-op
    /// when nothing changed.
    fn clear_dirty_flags(&mut self);
}

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id:         EntityId,
    pub kind:       String,
    pub level:      u32,
    pub health:     f32,
    pub max_health: f32,
    pub position:   Vec2,
    pub velocity:   Vec2,
    pub target:     Option<EntityId>,
    pub animation:  AnimationState,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentDelta {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec2>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<Vec2>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationState>,
    /// `Some(None)` means the target was cleared.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub target: Option<Option<EntityId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
}

impl AgentDelta {
    /// Number of changed fields carried (the id is not counted).
    pub fn field_count(&self) -> usize {
        [
            self.health.is_some(),
            self.position.is_some(),
            self.velocity.is_some(),
            self.animation.is_some(),
            self.target.is_some(),
            self.level.is_some(),
        ]
        .into_iter()
        .filter(|&b| b)
        .count()
    }
}

/// Maps a present field (even `null`) to `Some`, so `"target":null`
/// round-trips as `Some(None)`.
fn present<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(de).map(Some)
}

/// Everything published for one tick.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DeltaBatch {
    pub tick:    Tick,
    /// Ascending by agent id.
    pub deltas:  Vec<AgentDelta>,
    /// Agents that died or despawned since the previous publish.
    pub removed: Vec<EntityId>,
}

impl DeltaBatch {
    pub fn new(tick: Tick) -> Self {
        Self { tick, ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty() && self.removed.is_empty()
    }
}

// ── Agent impl ────────────────────────────────────────────────────────────────

impl NetworkDeltaEncoder for Agent {
    type Snapshot = AgentSnapshot;
    type Delta = AgentDelta;

    fn serialize(&self) -> AgentSnapshot {
        AgentSnapshot {
            id:         self.id(),
            kind:       self.kind().to_owned(),
            level:      self.level(),
            health:     self.health(),
            max_health: self.max_health(),
            position:   self.position(),
            velocity:   self.velocity(),
            target:     self.target().map(|t| t.id),
            animation:  self.animation(),
        }
    }

    #[inline]
    fn is_dirty(&self) -> bool {
        !self.dirty_fields().is_empty()
    }

    fn serialize_delta(&self) -> Option<AgentDelta> {
        let dirty = self.dirty_fields();
        if dirty.is_empty() {
            return None;
        }
        let mut delta = AgentDelta { id: self.id(), ..AgentDelta::default() };
        for field in dirty.iter() {
            match field {
                AgentField::Health    => delta.health = Some(self.health()),
                AgentField::Position  => delta.position = Some(self.position()),
                AgentField::Velocity  => delta.velocity = Some(self.velocity()),
                AgentField::Animation => delta.animation = Some(self.animation()),
                AgentField::Target    => delta.target = Some(self.target().map(|t| t.id)),
                AgentField::Level     => delta.level = Some(self.level()),
            }
        }
        Some(delta)
    }

    fn clear_dirty_flags(&mut self) {
        self.clear_dirty();
    }
}
