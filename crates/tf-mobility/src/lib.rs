//! `tf-mobility`: the movement phase of the decision pipeline.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                       |
//! |------------|----------------------------------------------------------------|
//! | [`state`]  | `MovementMode`, `MovementState`: per-agent movement state      |
//! | [`store`]  | `MobilityStore`: states keyed by `EntityId`                    |
//! | [`engine`] | `MovementPlanner<P>`, `MovementRequest`, `MovementDecision`    |
//! | [`error`]  | `MobilityError`, `MobilityResult<T>`                           |
//!
//! # Movement model
//!
//! Movement is impulse-driven.  Each movement cadence the planner turns the
//! agent's target into a heading, either from a pathfinder waypoint or from a
//! straight-line fallback, and returns a force of
//! `heading * speed * cadence_secs + steering * steering_weight`.  The
//! simulation applies it to the agent's physics body; the physics step then
//! integrates velocity into position.
//!
//! A `None` from the pathfinder is never an error.  It selects one of the
//! fallbacks in [`MovementPlanner::plan`], and the question is asked again at
//! the next movement cadence.

pub mod engine;
pub mod error;
pub mod state;
pub mod store;

#[cfg(test)]
mod tests;

pub use engine::{MovementDecision, MovementPlanner, MovementRequest};
pub use error::{MobilityError, MobilityResult};
pub use state::{MovementMode, MovementState};
pub use store::MobilityStore;
