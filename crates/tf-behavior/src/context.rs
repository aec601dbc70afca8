//! Read-only view handed to abilities and AI behaviors.

use tf_agent::{Agent, TargetRef};
use tf_core::{EntityId, Tick, Vec2};

use crate::CandidatePool;

/// Snapshot of one agent's surroundings for a single decision phase.
///
/// Built by the pipeline after the targeting phase, so `target` already
/// reflects this tick's decision.  All borrows end before intents are
/// applied.
#[derive(Clone, Copy)]
pub struct DecisionContext<'a> {
    pub tick:            Tick,
    /// Seconds of simulation time per tick.
    pub tick_secs:       f32,
    pub agent:           &'a Agent,
    pub target:          Option<TargetRef>,
    /// Read from the live position source this tick.
    pub target_position: Option<Vec2>,
    pub candidates:      &'a CandidatePool,
    /// Agents near `agent`, ascending by id, excluding `agent`.
    pub neighbours:      &'a [(EntityId, Vec2)],
}

impl DecisionContext<'_> {
    #[inline]
    pub fn position(&self) -> Vec2 {
        self.agent.position()
    }

    pub fn target_distance(&self) -> Option<f32> {
        self.target_position.map(|p| self.agent.position().distance(p))
    }

    /// `true` when a target exists and lies within the template's attack range.
    pub fn in_attack_range(&self) -> bool {
        self.target_distance()
            .is_some_and(|d| d <= self.agent.template().attack_range)
    }
}
