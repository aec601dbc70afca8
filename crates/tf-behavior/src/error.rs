use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BehaviorError {
    #[error("agent kind {kind:?} names behavior {behavior:?} with no registered factory")]
    MissingBehavior { kind: String, behavior: String },

    #[error("agent kind {kind:?} names ability {ability:?} with no registered factory")]
    MissingAbility { kind: String, ability: String },

    #[error("no agent kind named {0:?}")]
    MissingKind(String),
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;
