use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// `start()` was called on a scheduler that already has an anchor time.
    #[error("tick scheduler already started")]
    AlreadyStarted,

    #[error("tick interval must be greater than zero")]
    ZeroInterval,
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
