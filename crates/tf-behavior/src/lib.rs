//! `tf-behavior`: how agents choose targets, steer, and use abilities.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                         |
//! |---------------|------------------------------------------------------------------|
//! | [`targeting`] | `TargetSelector`, `TargetStrategy`, `CandidatePool`, `TargetDecision` |
//! | [`steering`]  | `SteeringComposer`, `SteeringBehavior`, `Separation`, `Seek`, `Wander` |
//! | [`ability`]   | `Ability` trait, `Cooldowns`, `SelfHeal`, `Charge`, `Shockwave`  |
//! | [`ai`]        | `AiBehavior` trait, `MeleeAi`, `RangedAi`, `SwarmAi`             |
//! | [`kind`]      | `AgentKind`, `KindRegistryBuilder` factory tables, `KindRegistry` |
//! | [`context`]   | `DecisionContext<'a>`: read-only view for abilities and AI       |
//! | [`intent`]    | `Intent` enum                                                    |
//! | [`error`]     | `BehaviorError`, `BehaviorResult<T>`                             |
//!
//! # Design notes
//!
//! Everything here reads state and returns values.  The decision pipeline in
//! tf-sim collects the resulting `Intent`s per agent and applies them after
//! the agent's phases finish, so abilities and AI behaviors never hold
//! mutable access to the world.
//!
//! Per-kind customization is composition, not inheritance: an `AgentKind`
//! pairs one shared `AiBehavior` with a list of shared `Ability` objects,
//! looked up by name in factory tables built once at setup.

pub mod ability;
pub mod ai;
pub mod context;
pub mod error;
pub mod intent;
pub mod kind;
pub mod steering;
pub mod targeting;

#[cfg(test)]
mod tests;

pub use ability::{Ability, Charge, Cooldowns, SelfHeal, Shockwave};
pub use ai::{Activity, AiBehavior, MeleeAi, RangedAi, SwarmAi};
pub use context::DecisionContext;
pub use error::{BehaviorError, BehaviorResult};
pub use intent::Intent;
pub use kind::{AbilityFactory, AgentKind, BehaviorFactory, KindRegistry, KindRegistryBuilder};
pub use steering::{Seek, Separation, SteeringBehavior, SteeringComposer, SteeringForce, SteeringInput, Wander};
pub use targeting::{
    Candidate, CandidatePool, TargetDecision, TargetQuery, TargetSelector, TargetStrategy,
};
