//! Runtime fault boundary.
//!
//! Scheduled tasks, agent decision phases, and abilities are user code.  A
//! failure in one of them must stay local: the tick loop and every other
//! agent carry on.  [`guard`] is the single place where that containment
//! happens. It turns both an `Err` return and a panic into a [`Fault`] the
//! caller logs and drops.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;

/// A contained runtime failure inside a callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    /// The callback returned an error.
    #[error("{0}")]
    Failed(String),

    /// The callback panicked; the payload message is kept when it is a string.
    #[error("panicked: {0}")]
    Panicked(String),
}

impl Fault {
    pub fn failed(msg: impl Into<String>) -> Fault {
        Fault::Failed(msg.into())
    }

    #[inline]
    pub fn is_panic(&self) -> bool {
        matches!(self, Fault::Panicked(_))
    }
}

impl From<String> for Fault {
    fn from(msg: String) -> Fault {
        Fault::Failed(msg)
    }
}

impl From<&str> for Fault {
    fn from(msg: &str) -> Fault {
        Fault::Failed(msg.to_owned())
    }
}

/// Run `f`, converting a panic into [`Fault::Panicked`].
///
/// State touched by `f` before the panic stays as it was left; callers only
/// guard closures whose partial effects are acceptable (a half-computed
/// intent list is simply discarded).
pub fn guard<T>(f: impl FnOnce() -> Result<T, Fault>) -> Result<T, Fault> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(Fault::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
