//! `tf-sim`: tick processing for the tickforge simulation core.
//!
//! # Tick order
//!
//! ```text
//! for each tick T (from the stepped runner or the TickScheduler):
//!   ① Reconcile : drop directory handle mappings of agents despawned at T-1.
//!   ② Tasks     : TaskQueue::process_tasks(T), priority desc, FIFO.
//!   ③ Commands  : drain inbound commands (externals, debug target/ability).
//!   ④ Views     : rebuild SpatialIndex and the target CandidatePool.
//!   ⑤ Decide    : DecisionPipeline::run_agent per agent, ascending id,
//!                 each inside a fault boundary:
//!                   targeting → movement → abilities → animation
//!   ⑥ Apply     : intents in ascending agent id:
//!                   SetTarget / ClearTarget  → agent + TargetAcquired/Lost
//!                   ApplyImpulse / Stop      → physics capability
//!                   Attack                   → Damageable or DamageSink
//!                   Heal / SetAnimation      → agent setters (dirty fields)
//!   ⑦ Physics   : PhysicsWorld::step, positions/velocities copied back.
//!   ⑧ Deaths    : zero-health agents leave physics and the directory.
//!   ⑨ Publish   : DeltaBatch of due dirty agents + removed ids.
//!   ⑩ Events    : EventBus::dispatch.
//! ```
//!
//! # Modules
//!
//! | Module       | Contents                                                      |
//! |--------------|---------------------------------------------------------------|
//! | [`world`]    | `World`, `ExternalEntity`, `DamageSink`, `DamageLedger`       |
//! | [`pipeline`] | `DecisionPipeline`, `PipelineView`, `AgentOutcome`            |
//! | [`sim`]      | `Sim`, `TickStats`, stepped and real-time runners             |
//! | [`builder`]  | `SimBuilder`                                                  |
//! | [`events`]   | `SimEvent`, `EventKind`, `EventBus`                           |
//! | [`command`]  | `InboundCommand`                                              |
//! | [`observer`] | `SimObserver`, `NoopObserver`                                 |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use tf_agent::load_templates_csv;
//! use tf_core::{SimConfig, Vec2};
//! use tf_sim::{NoopObserver, SimBuilder};
//!
//! let templates = load_templates_csv(Path::new("templates.csv"))?;
//! let mut sim = SimBuilder::new(SimConfig::default(), templates).build()?;
//! sim.world.spawn("grunt", 1, Vec2::new(0.0, 0.0))?;
//! sim.run_ticks(100, &mut NoopObserver);
//! ```

pub mod builder;
pub mod command;
pub mod error;
pub mod events;
pub mod observer;
pub mod pipeline;
pub mod sim;
pub mod world;


pub use builder::SimBuilder;
pub use command::InboundCommand;
pub use error::{SimError, SimResult};
pub use events::{EventBus, EventHandler, EventKind, SimEvent};
pub use observer::{NoopObserver, SimObserver};
pub use pipeline::{AgentOutcome, DecisionPipeline, DuePhases, PipelineView};
pub use sim::{Sim, TickStats};
pub use world::{AgentBrain, DamageLedger, DamageRecord, DamageSink, ExternalEntity, LivePositions, World};
