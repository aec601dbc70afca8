use tf_core::EntityId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MobilityError {
    #[error("agent {0} has a non-finite position or target")]
    NonFinite(EntityId),
}

pub type MobilityResult<T> = Result<T, MobilityError>;
