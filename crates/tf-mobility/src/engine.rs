//! Movement planner: waypoint requests plus the no-path fallback policy.

use tracing::trace;

use tf_core::{EntityId, MovementConfig, Tick, Vec2};
use tf_spatial::Pathfinder;

use crate::{MobilityError, MobilityResult, MobilityStore, MovementMode};

/// One agent's movement question for this cadence.
#[derive(Copy, Clone, Debug)]
pub struct MovementRequest {
    pub agent:        EntityId,
    pub position:     Vec2,
    /// Live target position, `None` without a target.
    pub target:       Option<Vec2>,
    pub attack_range: f32,
    /// World units per second.
    pub speed:        f32,
    pub width:        f32,
    pub height:       f32,
    /// Simulation seconds since this agent's previous movement phase.
    pub cadence_secs: f32,
    /// Composed steering output, added after weighting.
    pub steering:     Vec2,
}

/// Outcome of one movement phase.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum MovementDecision {
    /// No target.  Steering still applies.
    Idle { force: Vec2 },
    /// Target within attack range.  No movement.
    InRange,
    /// Move toward `waypoint`.  `direct` is `true` when the pathfinder had
    /// nothing and a straight-line fallback was taken.
    Move { force: Vec2, waypoint: Vec2, direct: bool },
    /// No path yet and no fallback applies.  Try again next cadence.
    Hold,
    /// Too far away with no path.  The target should be dropped.
    GiveUp,
}

impl MovementDecision {
    /// Impulse to apply this cadence (zero unless `Idle` or `Move`).
    pub fn force(&self) -> Vec2 {
        match *self {
            MovementDecision::Idle { force } | MovementDecision::Move { force, .. } => force,
            _ => Vec2::ZERO,
        }
    }

    #[inline]
    pub fn is_move(&self) -> bool {
        matches!(self, MovementDecision::Move { .. })
    }
}

/// Wraps a [`Pathfinder`] and a [`MobilityStore`].
///
/// # Type parameter
///
/// `P` is the pathfinding capability.  Tests plug in scripted pathfinders;
/// the simulation uses `Box<dyn Pathfinder>` so the backend can be chosen at
/// build time.
pub struct MovementPlanner<P: Pathfinder> {
    pub pathfinder: P,
    pub store:      MobilityStore,
    config:         MovementConfig,
}

impl<P: Pathfinder> MovementPlanner<P> {
    pub fn new(pathfinder: P, config: MovementConfig) -> Self {
        Self { pathfinder, store: MobilityStore::new(), config }
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    /// Decide how `req.agent` moves this cadence.
    ///
    /// In order: no target → idle; within attack range → stay; pathfinder
    /// waypoint → follow it; otherwise fall back to direct movement when the
    /// target is very close, or close with clear line of sight; give up when
    /// the target is beyond `give_up_distance`; hold otherwise.
    pub fn plan(&mut self, req: &MovementRequest, now: Tick) -> MobilityResult<MovementDecision> {
        if !req.position.is_finite() || !req.steering.is_finite() {
            return Err(MobilityError::NonFinite(req.agent));
        }
        let steering = req.steering * self.config.steering_weight;

        let Some(target) = req.target else {
            self.store.entry(req.agent, now).enter(MovementMode::Idle, now, None);
            return Ok(MovementDecision::Idle { force: steering });
        };
        if !target.is_finite() {
            return Err(MobilityError::NonFinite(req.agent));
        }

        let distance = req.position.distance(target);
        if distance <= req.attack_range {
            self.store.entry(req.agent, now).enter(MovementMode::InRange, now, None);
            return Ok(MovementDecision::InRange);
        }

        let path = self
            .pathfinder
            .request_path(req.agent, req.position, target, req.width, req.height);

        let (mode, waypoint, direct) = match path {
            Some(wp) => (MovementMode::Pathing, wp, false),
            None if distance < self.config.direct_threshold => (MovementMode::Direct, target, true),
            None if distance < self.config.line_of_sight_threshold
                && self.pathfinder.has_line_of_sight(req.position, target) =>
            {
                (MovementMode::Direct, target, true)
            }
            None if distance > self.config.give_up_distance => {
                trace!(agent = %req.agent, distance, "no path, giving up on target");
                self.pathfinder.invalidate_path(req.agent);
                self.store.entry(req.agent, now).enter(MovementMode::Idle, now, None);
                return Ok(MovementDecision::GiveUp);
            }
            None => {
                self.store.entry(req.agent, now).enter(MovementMode::Holding, now, None);
                return Ok(MovementDecision::Hold);
            }
        };

        let heading = (waypoint - req.position).normalized();
        let force = heading * (req.speed * req.cadence_secs) + steering;
        self.store.entry(req.agent, now).enter(mode, now, Some(waypoint));
        Ok(MovementDecision::Move { force, waypoint, direct })
    }

    /// Drop any cached route for `agent`.
    pub fn invalidate(&mut self, agent: EntityId) {
        self.pathfinder.invalidate_path(agent);
    }

    /// Forget `agent` entirely.
    pub fn despawn(&mut self, agent: EntityId) {
        self.pathfinder.invalidate_path(agent);
        self.store.remove(agent);
    }
}
