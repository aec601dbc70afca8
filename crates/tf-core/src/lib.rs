//! `tf-core`: foundational types for the `tickforge` simulation core.
//!
//! This crate is a dependency of every other `tf-*` crate.  It intentionally
//! has no `tf-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                                       |
//! |------------|----------------------------------------------------------------|
//! | [`ids`]    | `EntityId`, `PhysicsHandle`, `TaskId`                          |
//! | [`geo`]    | `Vec2` planar vector math                                      |
//! | [`time`]   | `Tick`, `SimClock`                                             |
//! | [`config`] | `SimConfig`, `CadenceConfig`, `MovementConfig`, `TargetingConfig` |
//! | [`rng`]    | `AgentRng` (per-agent), `SimRng` (global)                      |
//! | [`target`] | `TargetType` enum                                              |
//! | [`fault`]  | `Fault`, `guard`: the callback containment boundary           |
//! | [`error`]  | `TfError`, `TfResult`                                          |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |
//!           | Required for TOML config loading and the wire types.       |

pub mod config;
pub mod error;
pub mod fault;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod target;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{CadenceConfig, MovementConfig, SimConfig, TargetingConfig};
pub use error::{TfError, TfResult};
pub use fault::{Fault, guard};
pub use geo::Vec2;
pub use ids::{EntityId, PhysicsHandle, TaskId};
pub use rng::{AgentRng, SimRng};
pub use target::TargetType;
pub use time::{SimClock, Tick};
