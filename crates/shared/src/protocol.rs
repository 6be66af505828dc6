use serde::{Deserialize, Serialize};

use crate::domain::{OptionIndex, PollOption};

/// Body of `POST /polls`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePollRequest {
    pub question: String,
    pub options: [PollOption; 2],
}

impl CreatePollRequest {
    pub fn new(
        question: impl Into<String>,
        option1: impl Into<String>,
        option2: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            options: [PollOption::new(option1), PollOption::new(option2)],
        }
    }
}

/// Body of `POST /polls/{poll_id}/vote`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub option_index: OptionIndex,
}
