//! The per-agent decision pipeline.
//!
//! One call to [`DecisionPipeline::run_agent`] runs the phases that are due
//! for one agent this tick:
//!
//! ```text
//! targeting   every cadence.targeting ticks   → SetTarget / ClearTarget
//! movement    every cadence.movement ticks    → ApplyImpulse / Stop
//! abilities   every cadence.abilities ticks   → Attack / ability intents
//! animation   whenever movement or abilities ran → SetAnimation
//! ```
//!
//! Each cadence is offset by the agent's stagger, so a large population
//! spreads its work across ticks instead of spiking on multiples of `N`.
//!
//! The pipeline only reads the world.  Everything it wants done comes back
//! as [`Intent`]s that the simulation applies afterwards in ascending agent
//! order.  The exceptions are the agent's own decision state (steering
//! caches, RNG, cooldowns) and the movement planner's per-agent record.

use tracing::{trace, warn};

use tf_agent::{Agent, TargetRef};
use tf_behavior::{
    Activity, AgentKind, CandidatePool, Cooldowns, DecisionContext, Intent, SteeringInput,
    TargetDecision, TargetQuery, TargetSelector,
};
use tf_core::{CadenceConfig, Fault, SimConfig, Tick, guard};
use tf_mobility::{MovementDecision, MovementPlanner, MovementRequest};
use tf_spatial::{Pathfinder, SpatialIndex};

use crate::world::{AgentBrain, LivePositions};

/// Read-only world state shared by every agent's pipeline run in a tick.
#[derive(Copy, Clone)]
pub struct PipelineView<'a> {
    pub positions:  LivePositions<'a>,
    pub candidates: &'a CandidatePool,
    pub index:      &'a SpatialIndex,
}

/// Which phases are due for one agent this tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DuePhases {
    pub targeting: bool,
    pub movement:  bool,
    pub abilities: bool,
}

impl DuePhases {
    #[inline]
    pub fn any(self) -> bool {
        self.targeting || self.movement || self.abilities
    }
}

/// What one agent asked for this tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AgentOutcome {
    pub intents:        Vec<Intent>,
    /// Abilities that executed, in slot order.
    pub abilities_used: Vec<&'static str>,
    /// Abilities whose execution faulted and was dropped.
    pub ability_faults: usize,
}

#[derive(Clone, Debug)]
pub struct DecisionPipeline {
    selector:  TargetSelector,
    cadence:   CadenceConfig,
    tick_secs: f32,
    tick_ms:   u64,
}

impl DecisionPipeline {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            selector:  TargetSelector::new(&config.targeting),
            cadence:   config.cadence.clone(),
            tick_secs: config.tick_interval_ms as f32 / 1_000.0,
            tick_ms:   config.tick_interval_ms,
        }
    }

    pub fn selector(&self) -> &TargetSelector {
        &self.selector
    }

    pub fn due(&self, tick: Tick, stagger: u64) -> DuePhases {
        DuePhases {
            targeting: tick.is_due(self.cadence.targeting, stagger),
            movement:  tick.is_due(self.cadence.movement, stagger),
            abilities: tick.is_due(self.cadence.abilities, stagger),
        }
    }

    /// `true` when `agent` should be included in this tick's delta batch.
    pub fn sync_due(&self, tick: Tick, agent: &Agent) -> bool {
        tick.is_due(self.cadence.network_sync, agent.stagger())
    }

    /// Run the due phases for `agent`.
    ///
    /// # Errors
    /// A [`Fault`] when the movement planner rejects the agent's state.  The
    /// caller drops the agent's intents for this tick.
    pub fn run_agent<P: Pathfinder>(
        &self,
        tick:    Tick,
        agent:   &Agent,
        kind:    &AgentKind,
        brain:   &mut AgentBrain,
        planner: &mut MovementPlanner<P>,
        view:    &PipelineView<'_>,
    ) -> Result<AgentOutcome, Fault> {
        let due = self.due(tick, agent.stagger());
        let mut out = AgentOutcome::default();
        if !due.any() {
            return Ok(out);
        }

        // ── Targeting ─────────────────────────────────────────────────────
        let mut target = agent.target().copied();
        if due.targeting {
            target = self.targeting(agent, kind, target, view, &mut out.intents);
        }

        let neighbours = if due.movement || due.abilities {
            let radius = brain.steering.neighbour_radius();
            if radius > 0.0 {
                view.index.neighbours(agent.id(), agent.position(), radius)
            } else {
                Vec::new()
            }
        } else {
            Vec::new()
        };

        // ── Movement ──────────────────────────────────────────────────────
        if due.movement {
            let target_pos = target.and_then(|t| t.position(&view.positions));
            let steering = brain.steering.calculate(
                &SteeringInput {
                    agent:      agent.id(),
                    position:   agent.position(),
                    velocity:   agent.velocity(),
                    neighbours: &neighbours,
                    target:     target_pos,
                    now_ms:     tick.0.saturating_mul(self.tick_ms),
                },
                &mut brain.rng,
            );
            let template = agent.template();
            let req = MovementRequest {
                agent:        agent.id(),
                position:     agent.position(),
                target:       target_pos,
                attack_range: template.attack_range,
                speed:        template.speed,
                width:        template.width,
                height:       template.height,
                cadence_secs: self.tick_secs * self.cadence.movement as f32,
                steering,
            };
            let decision = planner
                .plan(&req, tick)
                .map_err(|e| Fault::failed(e.to_string()))?;
            match decision {
                MovementDecision::Idle { force } => {
                    if !force.is_zero() {
                        out.intents.push(Intent::ApplyImpulse(force));
                    }
                }
                MovementDecision::InRange | MovementDecision::Hold => out.intents.push(Intent::Stop),
                MovementDecision::Move { force, .. } => out.intents.push(Intent::ApplyImpulse(force)),
                MovementDecision::GiveUp => {
                    trace!(agent = %agent.id(), "movement gave up on target");
                    out.intents.push(Intent::ClearTarget);
                    target = None;
                }
            }
            brain.moving = decision.is_move();
        }

        // ── Abilities ─────────────────────────────────────────────────────
        let mut activity = Activity { moving: brain.moving, ..Activity::default() };
        if due.abilities {
            let ctx = DecisionContext {
                tick,
                tick_secs: self.tick_secs,
                agent,
                target,
                target_position: target.and_then(|t| t.position(&view.positions)),
                candidates: view.candidates,
                neighbours: &neighbours,
            };
            self.abilities(&ctx, kind, brain, &mut activity, &mut out);
        }

        // ── Animation ─────────────────────────────────────────────────────
        if due.movement || due.abilities {
            let animation = kind.ai.animation(activity);
            if animation != agent.animation() {
                out.intents.push(Intent::SetAnimation(animation));
            }
        }

        Ok(out)
    }

    fn targeting(
        &self,
        agent:   &Agent,
        kind:    &AgentKind,
        current: Option<TargetRef>,
        view:    &PipelineView<'_>,
        intents: &mut Vec<Intent>,
    ) -> Option<TargetRef> {
        let query = TargetQuery {
            seeker:       agent.id(),
            strategy:     kind.ai.strategy(),
            position:     agent.position(),
            max_distance: agent.template().detection_range,
        };
        let live = current.as_ref().map(|t| (t, t.position(&view.positions)));
        match self.selector.decide_target(&query, live, view.candidates) {
            TargetDecision::Keep => current,
            TargetDecision::Adopt(t) | TargetDecision::Switch(t) => {
                intents.push(Intent::SetTarget(t));
                Some(t)
            }
            TargetDecision::Clear => {
                intents.push(Intent::ClearTarget);
                None
            }
        }
    }

    fn abilities(
        &self,
        ctx:      &DecisionContext<'_>,
        kind:     &AgentKind,
        brain:    &mut AgentBrain,
        activity: &mut Activity,
        out:      &mut AgentOutcome,
    ) {
        let agent_id = ctx.agent.id();

        if ctx.in_attack_range() && brain.cooldowns.is_ready(Cooldowns::ATTACK, ctx.tick) {
            let attack = kind.ai.attack(ctx);
            if !attack.is_empty() {
                brain.cooldowns.trigger(
                    Cooldowns::ATTACK,
                    ctx.tick,
                    ctx.agent.template().attack_cooldown_ticks,
                );
                activity.attacked = true;
                out.intents.extend(attack);
            }
        }

        for (index, ability) in kind.abilities.iter().enumerate() {
            let slot = Cooldowns::ability_slot(index);
            if !brain.cooldowns.is_ready(slot, ctx.tick) {
                continue;
            }
            let rng = &mut brain.rng;
            let result = guard(|| {
                if ability.can_use(ctx) {
                    ability.execute(ctx, rng).map(Some)
                } else {
                    Ok(None)
                }
            });
            match result {
                Ok(Some(intents)) => {
                    brain.cooldowns.trigger(slot, ctx.tick, ability.cooldown_ticks());
                    activity.cast = true;
                    out.abilities_used.push(ability.name());
                    out.intents.extend(intents);
                }
                Ok(None) => {}
                Err(fault) => {
                    out.ability_faults += 1;
                    warn!(agent = %agent_id, ability = ability.name(), %fault, "ability failed");
                }
            }
        }
    }
}
