use shared::domain::PollId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PollError {
    #[error("validation failed: {0}")]
    ValidationFailed(String),
    #[error("poll {0} not found")]
    NotFound(PollId),
    #[error("server rejected request: {0}")]
    ServerRejected(String),
    #[error("stored polls could not be parsed: {0}")]
    ParseFailure(String),
    #[error("local storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl PollError {
    pub fn is_validation(&self) -> bool {
        matches!(self, PollError::ValidationFailed(_))
    }
}

impl From<shared::domain::OptionIndexOutOfRange> for PollError {
    fn from(value: shared::domain::OptionIndexOutOfRange) -> Self {
        PollError::ValidationFailed(value.to_string())
    }
}
