use std::{
    fmt,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Poll identifier. Locally generated ids are millisecond timestamps; remote
/// services may hand out numbers or strings, so both are accepted.
///
/// Ids compare by their printed form: `42` and `"42"` name the same poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PollId {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for PollId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollId::Numeric(value) => write!(f, "{value}"),
            PollId::Text(value) => f.write_str(value),
        }
    }
}

impl PartialEq for PollId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PollId::Numeric(a), PollId::Numeric(b)) => a == b,
            (PollId::Text(a), PollId::Text(b)) => a == b,
            (PollId::Numeric(n), PollId::Text(t)) | (PollId::Text(t), PollId::Numeric(n)) => {
                n.to_string() == *t
            }
        }
    }
}

impl Eq for PollId {}

impl Hash for PollId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl From<i64> for PollId {
    fn from(value: i64) -> Self {
        PollId::Numeric(value)
    }
}

impl From<&str> for PollId {
    fn from(value: &str) -> Self {
        match value.trim().parse::<i64>() {
            Ok(numeric) => PollId::Numeric(numeric),
            Err(_) => PollId::Text(value.trim().to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionIndex {
    First,
    Second,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("option index {0} is out of range; polls have exactly two options")]
pub struct OptionIndexOutOfRange(pub usize);

impl OptionIndex {
    pub fn as_usize(self) -> usize {
        match self {
            OptionIndex::First => 0,
            OptionIndex::Second => 1,
        }
    }
}

impl TryFrom<usize> for OptionIndex {
    type Error = OptionIndexOutOfRange;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OptionIndex::First),
            1 => Ok(OptionIndex::Second),
            other => Err(OptionIndexOutOfRange(other)),
        }
    }
}

impl Serialize for OptionIndex {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.as_usize() as u64)
    }
}

impl<'de> Deserialize<'de> for OptionIndex {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = usize::deserialize(deserializer)?;
        OptionIndex::try_from(raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    pub text: String,
    #[serde(default)]
    pub votes: u64,
}

impl PollOption {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            votes: 0,
        }
    }
}

/// A question with exactly two options. The vote total is always derived
/// from the option counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PollRecord", into = "PollRecord")]
pub struct Poll {
    pub id: PollId,
    pub question: String,
    pub options: [PollOption; 2],
    pub created_at: Option<String>,
}

impl Poll {
    pub fn total_votes(&self) -> u64 {
        self.options.iter().map(|option| option.votes).sum()
    }

    pub fn option(&self, index: OptionIndex) -> &PollOption {
        &self.options[index.as_usize()]
    }

    pub fn record_vote(&mut self, index: OptionIndex) {
        self.options[index.as_usize()].votes += 1;
    }
}

/// Persisted and wire form of a poll. `totalVotes` is written for readers
/// that expect it and ignored on input.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PollRecord {
    #[serde(alias = "pollId", alias = "pollID")]
    id: PollId,
    question: String,
    options: [PollOption; 2],
    #[serde(default, skip_deserializing)]
    total_votes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<String>,
}

impl From<PollRecord> for Poll {
    fn from(record: PollRecord) -> Self {
        Self {
            id: record.id,
            question: record.question,
            options: record.options,
            created_at: record.created_at,
        }
    }
}

impl From<Poll> for PollRecord {
    fn from(poll: Poll) -> Self {
        let total_votes = poll.total_votes();
        Self {
            id: poll.id,
            question: poll.question,
            options: poll.options,
            total_votes,
            created_at: poll.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionResult {
    pub text: String,
    pub votes: u64,
    pub percentage: u32,
}

/// Per-option share of the vote, rounded to the nearest whole percent.
/// Rounding drift is left as is, so the shares may sum to 99 or 101.
pub fn compute_results(poll: &Poll) -> Vec<OptionResult> {
    let total = poll.total_votes();
    poll.options
        .iter()
        .map(|option| OptionResult {
            text: option.text.clone(),
            votes: option.votes,
            percentage: percentage_of(option.votes, total),
        })
        .collect()
}

fn percentage_of(votes: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    ((votes as f64 / total as f64) * 100.0).round() as u32
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
