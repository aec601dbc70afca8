use thiserror::Error;

use tf_agent::AgentError;
use tf_behavior::BehaviorError;
use tf_core::TfError;
use tf_schedule::ScheduleError;
use tf_spatial::SpatialError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] TfError),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Behavior(#[from] BehaviorError),

    #[error("physics: {0}")]
    Spatial(#[from] SpatialError),

    #[error("scheduler: {0}")]
    Schedule(#[from] ScheduleError),
}

pub type SimResult<T> = Result<T, SimError>;
