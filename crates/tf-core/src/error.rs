//! Framework error type.
//!
//! Sub-crates define their own error enums and convert `TfError` into them
//! via `From` impls.  Runtime faults raised inside callbacks are a separate
//! type ([`Fault`][crate::Fault]) because they are contained, never
//! propagated.

use thiserror::Error;

use crate::EntityId;

/// The top-level error type for `tf-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum TfError {
    #[error("entity {0} not found")]
    EntityNotFound(EntityId),

    /// A programming error detected at construction time (missing factory
    /// entry, missing template, invalid config).
    #[error("configuration error: {0}")]
    Config(String),

    /// A setup-time invariant was broken (double registration, re-start).
    #[error("invariant violation: {0}")]
    Invariant(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `tf-*` crates.
pub type TfResult<T> = Result<T, TfError>;
