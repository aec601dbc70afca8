//! `tf-spatial`: the physical world as the simulation core sees it.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`physics`] | `PhysicsWorld` capability trait, `KinematicWorld`, `BodyDesc` |
//! | [`path`]    | `Pathfinder` capability trait, `DirectPathfinder`, `ObstacleMap`, `Obstacle` |
//! | [`index`]   | `SpatialIndex` (R-tree neighbour queries, rebuilt per tick)   |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                            |
//!
//! A production deployment replaces `KinematicWorld` and `DirectPathfinder`
//! with adapters over a real physics engine and path search; nothing outside
//! this crate names the concrete types except the simulation builder.

pub mod error;
pub mod index;
pub mod path;
pub mod physics;


pub use error::{SpatialError, SpatialResult};
pub use index::SpatialIndex;
pub use path::{DirectPathfinder, Obstacle, ObstacleMap, Pathfinder};
pub use physics::{BodyDesc, KinematicWorld, PhysicsWorld};
