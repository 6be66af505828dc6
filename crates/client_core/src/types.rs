use shared::protocol::CreatePollRequest;

use crate::error::PollError;

/// Trimmed, non-empty input for a new poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPoll {
    pub question: String,
    pub option1: String,
    pub option2: String,
}

impl NewPoll {
    pub fn parse(question: &str, option1: &str, option2: &str) -> Result<Self, PollError> {
        let question = question.trim();
        let option1 = option1.trim();
        let option2 = option2.trim();

        let mut missing = Vec::new();
        if question.is_empty() {
            missing.push("question");
        }
        if option1.is_empty() {
            missing.push("option 1");
        }
        if option2.is_empty() {
            missing.push("option 2");
        }
        if !missing.is_empty() {
            return Err(PollError::ValidationFailed(format!(
                "missing {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            question: question.to_string(),
            option1: option1.to_string(),
            option2: option2.to_string(),
        })
    }

    pub fn to_request(&self) -> CreatePollRequest {
        CreatePollRequest::new(&self.question, &self.option1, &self.option2)
    }
}
