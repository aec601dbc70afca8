//! Spatial-subsystem error type.

use thiserror::Error;

use tf_core::PhysicsHandle;

/// Errors produced by `tf-spatial`.
#[derive(Debug, Error, PartialEq)]
pub enum SpatialError {
    #[error("physics body {0} does not exist")]
    UnknownBody(PhysicsHandle),

    #[error("invalid body: {0}")]
    InvalidBody(String),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
