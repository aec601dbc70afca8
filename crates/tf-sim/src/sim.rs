//! The `Sim` struct and its tick processing.

use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, Sender};
use tracing::{debug, info, trace, warn};

use tf_agent::{AgentSnapshot, AnimationState, Damageable, DeltaBatch, NetworkDeltaEncoder};
use tf_behavior::Intent;
use tf_core::{EntityId, SimClock, SimConfig, TargetType, Tick, Vec2, guard};
use tf_mobility::MovementMode;
use tf_schedule::{
    Clock, CriticalSweep, SchedulerStats, TaskQueue, TaskRunStats, TickInfo, TickScheduler,
};

use crate::pipeline::{AgentOutcome, PipelineView};
use crate::world::LivePositions;
use crate::{DecisionPipeline, EventBus, InboundCommand, SimEvent, SimObserver, SimResult, World};

/// Per-tick counters handed to [`SimObserver::on_tick_end`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickStats {
    pub tick:       Tick,
    pub tasks:      TaskRunStats,
    /// Inbound commands applied (dropped ones excluded).
    pub commands:   usize,
    /// Agents with at least one phase due.
    pub decided:    usize,
    /// Agent pipeline runs and ability executions that faulted.
    pub faults:     usize,
    pub deaths:     usize,
    /// Agent deltas in the published batch.
    pub published:  usize,
    /// Live agents at the end of the tick.
    pub agents:     usize,
    /// Agents whose last movement decision was to hold position.
    pub holding:    usize,
    pub elapsed_us: u64,
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The simulation core.
///
/// Each tick ([`step`](Sim::step)) runs, in order:
///
/// 1. **Reconcile** the entity directory (drop handle mappings of agents
///    despawned last tick).
/// 2. **Tasks** due at this tick, priority order then FIFO.
/// 3. **Commands** from the inbound channel.
/// 4. **Views**: rebuild the neighbour index and target candidate pool.
/// 5. **Decide**: run the decision pipeline for every agent (ascending id),
///    each inside its own fault boundary.
/// 6. **Apply** every agent's intents, ascending id.
/// 7. **Physics** step, then copy positions and velocities back.
/// 8. **Deaths**: remove agents whose health reached zero.
/// 9. **Publish** the delta batch for agents whose sync cadence is due.
/// 10. **Events** dispatched to the bus.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    pub config:   SimConfig,
    pub clock:    SimClock,
    pub world:    World,
    /// Deferred work.  Callbacks receive the world mutably.
    pub tasks:    TaskQueue<World>,
    pub events:   EventBus,
    pub pipeline: DecisionPipeline,
    inbox:        Receiver<InboundCommand>,
    outbox:       Sender<InboundCommand>,
}

impl Sim {
    pub(crate) fn new(config: SimConfig, world: World, events: EventBus) -> Self {
        let (outbox, inbox) = channel::unbounded();
        Self {
            clock: config.make_clock(),
            pipeline: DecisionPipeline::new(&config),
            config,
            world,
            tasks: TaskQueue::new(),
            events,
            inbox,
            outbox,
        }
    }

    // ── Inbound boundary ──────────────────────────────────────────────────

    /// Queue a command for the next tick.
    pub fn submit(&self, command: InboundCommand) {
        // The receiver lives in `self`, so the channel cannot be disconnected.
        let _ = self.outbox.send(command);
    }

    /// A sender other threads can use to feed commands into the simulation.
    pub fn command_sender(&self) -> Sender<InboundCommand> {
        self.outbox.clone()
    }

    // ── Outbound boundary ─────────────────────────────────────────────────

    /// Full state of every live agent, ascending by id.  For client joins.
    pub fn full_snapshot(&self) -> Vec<AgentSnapshot> {
        self.world.directory.iter().map(NetworkDeltaEncoder::serialize).collect()
    }

    // ── Runners ───────────────────────────────────────────────────────────

    /// Run the next `n` ticks back to back, ignoring wall time and `end_tick`.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> Vec<TickStats> {
        (0..n)
            .map(|_| {
                let tick = self.clock.current_tick.offset(1);
                self.step(tick, observer)
            })
            .collect()
    }

    /// Run stepped ticks until `config.end_tick()`.  An unbounded config runs
    /// nothing and returns immediately.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) {
        let Some(end) = self.config.end_tick() else {
            warn!("run() needs total_ticks; use run_realtime for an unbounded simulation");
            return;
        };
        while self.clock.current_tick < end {
            let tick = self.clock.current_tick.offset(1);
            self.step(tick, observer);
        }
        observer.on_sim_end(self.clock.current_tick);
    }

    /// A drift-corrected scheduler configured from `config`.
    pub fn make_scheduler<C: Clock>(&self, clock: C) -> SimResult<TickScheduler<C>> {
        let scheduler = TickScheduler::new(clock, self.config.tick_interval())?
            .with_backlog_warning(self.config.backlog_warn_ticks);
        Ok(match self.config.total_ticks {
            Some(n) => scheduler.with_max_ticks(n),
            None => scheduler,
        })
    }

    /// The critical sweep configured from `config`.  An interval of `0`
    /// disables it.
    pub fn make_sweep(&self) -> CriticalSweep {
        match self.config.critical_sweep_interval_ms {
            0 => CriticalSweep::disabled(),
            ms => CriticalSweep::new(Duration::from_millis(ms)),
        }
    }

    /// Drive the simulation from `scheduler` in real time.
    ///
    /// At each iteration boundary the critical sweep is polled; when due,
    /// CRITICAL tasks up to the wall-clock tick run before the tick itself.
    pub fn run_realtime<C: Clock, O: SimObserver>(
        &mut self,
        scheduler: &mut TickScheduler<C>,
        sweep:     &CriticalSweep,
        observer:  &mut O,
    ) -> SimResult<SchedulerStats> {
        let stats = scheduler.run(|info: TickInfo| {
            if sweep.poll() {
                let swept = self.tasks.process_critical_tasks(info.wall_tick, &mut self.world);
                if swept.fired > 0 {
                    debug!(tick = %info.tick, wall_tick = %info.wall_tick, fired = swept.fired, "critical sweep");
                }
            }
            self.step(info.tick, observer);
            Ok(())
        })?;
        observer.on_sim_end(self.clock.current_tick);
        Ok(stats)
    }

    // ── Tick processing ───────────────────────────────────────────────────

    /// Process one tick.  Never fails: faults inside tasks, agents and
    /// abilities are contained and counted.
    pub fn step<O: SimObserver>(&mut self, tick: Tick, observer: &mut O) -> TickStats {
        let started = Instant::now();
        self.clock.advance_to(tick);
        observer.on_tick_start(tick);
        let mut stats = TickStats { tick, ..TickStats::default() };

        // ── 1. Directory cleanup ──────────────────────────────────────────
        let reconciled = self.world.directory.reconcile();
        if reconciled > 0 {
            trace!(tick = %tick, reconciled, "handle mappings reconciled");
        }

        // ── 2. Tasks ──────────────────────────────────────────────────────
        stats.tasks = self.tasks.process_tasks(tick, &mut self.world);

        // ── 3. Inbound commands ───────────────────────────────────────────
        while let Ok(command) = self.inbox.try_recv() {
            if command.apply(&mut self.world) {
                stats.commands += 1;
            }
        }

        // ── 4. Derived views ──────────────────────────────────────────────
        self.world.rebuild_views();

        // ── 5. Decide ─────────────────────────────────────────────────────
        let outcomes = self.decide(tick, &mut stats);

        // ── 6. Apply ──────────────────────────────────────────────────────
        for (agent, outcome) in outcomes {
            self.apply(agent, outcome);
        }

        // ── 7. Physics ────────────────────────────────────────────────────
        self.world.physics.step(self.clock.secs_for_ticks(1));
        self.world.sync_from_physics();

        // ── 8. Deaths ─────────────────────────────────────────────────────
        stats.deaths = self.reap(tick, observer);

        // ── 9. Publish ────────────────────────────────────────────────────
        let batch = self.collect_batch(tick);
        stats.published = batch.deltas.len();
        if !batch.is_empty() {
            observer.on_publish(&batch);
        }

        // ── 10. Events ────────────────────────────────────────────────────
        let events = std::mem::take(&mut self.world.events);
        self.events.dispatch(&events);

        stats.agents = self.world.directory.len();
        stats.holding = self.world.movement.store.count_in(MovementMode::Holding);
        stats.elapsed_us = started.elapsed().as_micros() as u64;
        observer.on_tick_end(&stats);
        stats
    }

    /// Run the pipeline for every agent.  Returns intents keyed by agent,
    /// ascending.
    fn decide(&mut self, tick: Tick, stats: &mut TickStats) -> Vec<(EntityId, AgentOutcome)> {
        let world = &mut self.world;
        let view = PipelineView {
            positions:  LivePositions { directory: &world.directory, externals: &world.externals },
            candidates: &world.candidates,
            index:      &world.index,
        };
        let mut outcomes = Vec::with_capacity(world.directory.len());

        for agent in world.directory.iter() {
            let id = agent.id();
            let Some(brain) = world.brains.get_mut(&id) else {
                warn!(agent = %id, "agent has no decision state; skipping");
                continue;
            };
            let Some(kind) = world.kinds.get(agent.kind()) else {
                warn!(agent = %id, kind = agent.kind(), "agent kind vanished from registry");
                continue;
            };
            if !self.pipeline.due(tick, agent.stagger()).any() {
                continue;
            }
            stats.decided += 1;

            let movement = &mut world.movement;
            let pipeline = &self.pipeline;
            match guard(|| pipeline.run_agent(tick, agent, kind, brain, movement, &view)) {
                Ok(outcome) => {
                    stats.faults += outcome.ability_faults;
                    if !outcome.intents.is_empty() || !outcome.abilities_used.is_empty() {
                        outcomes.push((id, outcome));
                    }
                }
                Err(fault) => {
                    stats.faults += 1;
                    warn!(tick = %tick, agent = %id, %fault, "agent decision failed; intents dropped");
                }
            }
        }
        outcomes
    }

    /// Apply one agent's intents in the order they were produced.  An agent
    /// killed earlier in the pass acts no further.
    fn apply(&mut self, id: EntityId, outcome: AgentOutcome) {
        let world = &mut self.world;
        if !world.directory.get(id).is_some_and(|a| a.is_alive()) {
            debug!(agent = %id, "agent died before acting; intents dropped");
            return;
        }
        for ability in outcome.abilities_used {
            world.events.push(SimEvent::AbilityUsed { agent: id, ability });
        }

        for intent in outcome.intents {
            let Some(agent) = world.directory.get_mut(id) else { return };
            if !agent.is_alive() {
                return;
            }
            let handle = agent.handle();
            match intent {
                Intent::SetTarget(target) => {
                    let previous = agent.set_target(Some(target));
                    if previous.map(|p| p.id) != Some(target.id) {
                        if let Some(p) = previous {
                            world.events.push(SimEvent::TargetLost { agent: id, target: p });
                        }
                        world.events.push(SimEvent::TargetAcquired { agent: id, target });
                        world.movement.invalidate(id);
                    }
                }
                Intent::ClearTarget => {
                    if let Some(p) = agent.set_target(None) {
                        world.events.push(SimEvent::TargetLost { agent: id, target: p });
                        world.movement.invalidate(id);
                    }
                }
                Intent::ApplyImpulse(impulse) => {
                    if let Err(err) = world.physics.apply_impulse(handle, impulse) {
                        warn!(agent = %id, %err, "impulse rejected");
                    }
                }
                Intent::Stop => {
                    if let Err(err) = world.physics.set_velocity(handle, Vec2::ZERO) {
                        warn!(agent = %id, %err, "stop rejected");
                    }
                }
                Intent::Attack { target, target_type, damage } => {
                    let dealt = match target_type {
                        TargetType::Agent => match world.directory.get_mut(target) {
                            Some(victim) => victim.take_damage(damage, Some(id)),
                            None => continue,
                        },
                        _ => {
                            if !world.externals.contains_key(&target) {
                                continue;
                            }
                            world.damage.take_damage(target, target_type, damage, Some(id));
                            damage
                        }
                    };
                    world.events.push(SimEvent::Attacked { attacker: id, target, dealt });
                }
                Intent::Heal(amount) => {
                    agent.heal(amount);
                }
                Intent::SetAnimation(animation) => agent.set_animation(animation),
                Intent::InvalidatePath => world.movement.invalidate(id),
            }
        }
    }

    /// Remove dead agents.  Returns how many died.
    fn reap<O: SimObserver>(&mut self, tick: Tick, observer: &mut O) -> usize {
        let dead: Vec<EntityId> = self
            .world
            .directory
            .iter()
            .filter(|a| !a.is_alive())
            .map(|a| a.id())
            .collect();
        for &id in &dead {
            let Some(mut agent) = self.world.remove_agent(id) else { continue };
            agent.set_animation(AnimationState::Dead);
            info!(tick = %tick, agent = %id, kind = agent.kind(), "agent died");
            self.world.events.push(SimEvent::AgentDied { agent: id, kind: agent.kind().to_owned() });
            observer.on_death(tick, &agent);
        }
        dead.len()
    }

    /// Deltas of dirty agents whose sync cadence is due, plus every agent
    /// removed since the previous batch.  Published agents are clean after.
    fn collect_batch(&mut self, tick: Tick) -> DeltaBatch {
        let mut batch = DeltaBatch::new(tick);
        batch.removed = std::mem::take(&mut self.world.removed);
        for agent in self.world.directory.iter_mut() {
            if !self.pipeline.sync_due(tick, agent) {
                continue;
            }
            if let Some(delta) = agent.serialize_delta() {
                batch.deltas.push(delta);
                agent.clear_dirty_flags();
            }
        }
        batch
    }
}
