use thiserror::Error;

use tf_core::{EntityId, PhysicsHandle};

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("entity {0} is already registered")]
    DuplicateId(EntityId),

    #[error("physics handle {0} is already mapped to {1}")]
    DuplicateHandle(PhysicsHandle, EntityId),

    #[error("entity {0} not found")]
    NotFound(EntityId),

    #[error("no template for agent kind {0:?}")]
    MissingTemplate(String),

    #[error("template parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AgentResult<T> = Result<T, AgentError>;
