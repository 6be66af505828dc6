//! Notifications shown after a user action, and how store errors map onto them.

use std::fmt;

use client_core::PollError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionContext {
    CreatePoll,
    Vote,
    Refresh,
    Results,
}

/// Transient notification for a single user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    level: NoticeLevel,
    message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn poll_created() -> Self {
        Self::success("Poll created successfully! 🎉")
    }

    pub fn vote_recorded(option_text: &str) -> Self {
        Self::success(format!("Thanks for voting for \"{option_text}\"! 🗳️"))
    }

    pub fn from_error(context: ActionContext, error: &PollError) -> Self {
        let message = match (context, error) {
            (ActionContext::CreatePoll, PollError::ValidationFailed(_)) => {
                "Please fill in all fields to create a poll!".to_string()
            }
            (_, PollError::ValidationFailed(reason)) => format!("Invalid input: {reason}"),
            (_, PollError::NotFound(poll_id)) => format!("Poll {poll_id} does not exist."),
            (ActionContext::Refresh, PollError::ServerRejected(reason)) => {
                format!("Could not load polls: {reason}")
            }
            (_, PollError::ServerRejected(reason)) => {
                format!("The polling service rejected the request: {reason}")
            }
            (_, PollError::ParseFailure(reason)) => {
                format!("Saved polls could not be read: {reason}")
            }
            (_, PollError::Storage(source)) => format!("Could not save polls: {source:#}"),
        };
        Self::error(message)
    }

    pub fn level(&self) -> NoticeLevel {
        self.level
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.level {
            NoticeLevel::Success => "✔",
            NoticeLevel::Error => "✖",
        };
        write!(f, "{marker} {}", self.message)
    }
}
