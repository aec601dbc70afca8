//! The `MobilityStore`: movement state keyed by entity id.

use std::collections::BTreeMap;

use tf_core::{EntityId, Tick};

use crate::{MovementMode, MovementState};

/// Movement state for every agent the planner has seen.
///
/// Entries are created lazily on an agent's first plan and removed on
/// despawn.  Iteration is in ascending id order.
#[derive(Debug, Default)]
pub struct MobilityStore {
    states: BTreeMap<EntityId, MovementState>,
}

impl MobilityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, agent: EntityId) -> Option<&MovementState> {
        self.states.get(&agent)
    }

    /// State for `agent`, created idle at `now` if absent.
    pub fn entry(&mut self, agent: EntityId, now: Tick) -> &mut MovementState {
        self.states.entry(agent).or_insert_with(|| MovementState::idle(now))
    }

    pub fn remove(&mut self, agent: EntityId) -> Option<MovementState> {
        self.states.remove(&agent)
    }

    /// Number of agents currently in `mode`.
    pub fn count_in(&self, mode: MovementMode) -> usize {
        self.states.values().filter(|s| s.mode == mode).count()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
