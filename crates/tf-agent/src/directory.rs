//! `EntityDirectory`: the id ↔ physics-handle registry of live agents.
//!
//! # Maps
//!
//! - `agents: BTreeMap<EntityId, Agent>` owns the agents.  Ordered, so every
//!   iteration (pipeline, apply phase, publish) is ascending by id.
//! - `handles: FxHashMap<PhysicsHandle, EntityId>` maps physics contacts back
//!   to agents.
//!
//! # Despawn window
//!
//! [`despawn`](EntityDirectory::despawn) removes the agent immediately but
//! leaves its handle mapping in place until [`reconcile`](EntityDirectory::reconcile)
//! runs at the start of the next tick.  During that window the mapping is an
//! orphan: [`get_by_handle`](EntityDirectory::get_by_handle) filters it out,
//! so no read ever observes a handle pointing at a missing agent.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use tf_core::{EntityId, PhysicsHandle, TargetType, Vec2};

use crate::{Agent, AgentError, AgentResult, PositionSource};

#[derive(Debug, Default)]
pub struct EntityDirectory {
    agents:  BTreeMap<EntityId, Agent>,
    handles: FxHashMap<PhysicsHandle, EntityId>,
    /// Handles of despawned agents awaiting `reconcile`.
    pending: Vec<PhysicsHandle>,
}

impl EntityDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new agent.
    ///
    /// # Errors
    /// - [`AgentError::DuplicateId`] if the id is live.
    /// - [`AgentError::DuplicateHandle`] if the handle maps to a live agent.
    ///   A handle still held by an orphaned mapping is taken over.
    pub fn register(&mut self, agent: Agent) -> AgentResult<()> {
        let id = agent.id();
        let handle = agent.handle();
        if self.agents.contains_key(&id) {
            return Err(AgentError::DuplicateId(id));
        }
        if let Some(&owner) = self.handles.get(&handle) {
            if self.agents.contains_key(&owner) {
                return Err(AgentError::DuplicateHandle(handle, owner));
            }
            self.pending.retain(|&h| h != handle);
        }
        self.handles.insert(handle, id);
        self.agents.insert(id, agent);
        debug!(agent = %id, %handle, "agent registered");
        Ok(())
    }

    /// Remove an agent.  Its handle mapping is dropped at the next
    /// [`reconcile`](Self::reconcile).
    pub fn despawn(&mut self, id: EntityId) -> Option<Agent> {
        let agent = self.agents.remove(&id)?;
        self.pending.push(agent.handle());
        debug!(agent = %id, "agent despawned");
        Some(agent)
    }

    /// Drop the handle mappings of despawned agents, plus any other mapping
    /// whose agent is gone.  Returns the number of mappings removed.
    pub fn reconcile(&mut self) -> usize {
        let mut removed = 0;
        for handle in std::mem::take(&mut self.pending) {
            if let Some(id) = self.handles.get(&handle) {
                if !self.agents.contains_key(id) {
                    self.handles.remove(&handle);
                    removed += 1;
                }
            }
        }
        let stray = self.orphaned_handles();
        if !stray.is_empty() {
            warn!(count = stray.len(), "removing untracked orphan handle mappings");
            for handle in &stray {
                self.handles.remove(handle);
            }
            removed += stray.len();
        }
        removed
    }

    /// Handle mappings whose agent no longer exists, ascending.
    pub fn orphaned_handles(&self) -> Vec<PhysicsHandle> {
        let mut out: Vec<PhysicsHandle> = self
            .handles
            .iter()
            .filter(|(_, id)| !self.agents.contains_key(id))
            .map(|(&h, _)| h)
            .collect();
        out.sort_unstable();
        out
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    #[inline]
    pub fn get(&self, id: EntityId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Agent> {
        self.agents.get_mut(&id)
    }

    pub fn get_by_handle(&self, handle: PhysicsHandle) -> Option<&Agent> {
        self.handles.get(&handle).and_then(|id| self.agents.get(id))
    }

    pub fn get_by_handle_mut(&mut self, handle: PhysicsHandle) -> Option<&mut Agent> {
        let id = *self.handles.get(&handle)?;
        self.agents.get_mut(&id)
    }

    /// Like [`get`](Self::get), but a missing id is an error.
    pub fn require(&self, id: EntityId) -> AgentResult<&Agent> {
        self.agents.get(&id).ok_or(AgentError::NotFound(id))
    }

    #[inline]
    pub fn contains(&self, id: EntityId) -> bool {
        self.agents.contains_key(&id)
    }

    // ── Iteration (ascending id) ──────────────────────────────────────────

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.agents.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Agent> {
        self.agents.values_mut()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Number of handle mappings, orphans included.
    pub fn handle_count(&self) -> usize {
        self.handles.len()
    }
}

impl PositionSource for EntityDirectory {
    fn position_of(&self, id: EntityId, target_type: TargetType) -> Option<Vec2> {
        match target_type {
            TargetType::Agent => self.agents.get(&id).map(Agent::position),
            _ => None,
        }
    }
}
