use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Local, Utc};
use shared::domain::{OptionIndex, Poll, PollId, PollOption};
use storage::KeyValueStore;
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

use crate::{event_channel, CreatedPoll, NewPoll, PollError, PollStore, StoreEvent};

pub const DEFAULT_STORAGE_KEY: &str = "haloPolls";
const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Outcome of rehydrating the collection when the store was opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadReport {
    Missing,
    Loaded { polls: usize },
    Recovered { reason: String },
}

/// Poll store that keeps the whole collection in memory and writes it back
/// to key-value storage as one JSON record after every mutation.
pub struct LocalPollStore {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    polls: Mutex<Vec<Poll>>,
    load_report: LoadReport,
    events: broadcast::Sender<StoreEvent>,
}

impl LocalPollStore {
    pub async fn open(storage: Arc<dyn KeyValueStore>) -> Result<Self, PollError> {
        Self::open_with_key(storage, DEFAULT_STORAGE_KEY).await
    }

    pub async fn open_with_key(
        storage: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
    ) -> Result<Self, PollError> {
        let key = key.into();
        let raw = storage.get_item(&key).await?;

        let (polls, load_report) = match raw {
            None => (Vec::new(), LoadReport::Missing),
            Some(raw) => match decode_polls(&raw) {
                Ok(polls) => {
                    let count = polls.len();
                    (polls, LoadReport::Loaded { polls: count })
                }
                Err(err) => {
                    warn!(%key, error = %err, "discarding unreadable poll record");
                    (
                        Vec::new(),
                        LoadReport::Recovered {
                            reason: err.to_string(),
                        },
                    )
                }
            },
        };
        info!(%key, polls = polls.len(), "local poll store opened");

        Ok(Self {
            storage,
            key,
            polls: Mutex::new(polls),
            load_report,
            events: event_channel(),
        })
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    async fn persist(&self, polls: &[Poll]) -> Result<(), PollError> {
        let raw = serde_json::to_string(polls)
            .map_err(|e| PollError::Storage(anyhow::anyhow!("failed to encode polls: {e}")))?;
        self.storage.set_item(&self.key, &raw).await?;
        Ok(())
    }
}

pub(crate) fn decode_polls(raw: &str) -> Result<Vec<Poll>, PollError> {
    serde_json::from_str(raw).map_err(|e| PollError::ParseFailure(e.to_string()))
}

/// Millisecond timestamp, bumped past any existing numeric id so rapid
/// creation never reuses one.
fn next_poll_id(polls: &[Poll]) -> PollId {
    let now = Utc::now().timestamp_millis();
    let highest = polls
        .iter()
        .filter_map(|poll| match poll.id {
            PollId::Numeric(value) => Some(value),
            PollId::Text(_) => None,
        })
        .max();
    match highest {
        Some(highest) if highest >= now => PollId::Numeric(highest + 1),
        _ => PollId::Numeric(now),
    }
}

#[async_trait]
impl PollStore for LocalPollStore {
    async fn create_poll(
        &self,
        question: &str,
        option1: &str,
        option2: &str,
    ) -> Result<CreatedPoll, PollError> {
        let input = NewPoll::parse(question, option1, option2)?;

        let mut guard = self.polls.lock().await;
        let poll = Poll {
            id: next_poll_id(&guard),
            question: input.question,
            options: [PollOption::new(input.option1), PollOption::new(input.option2)],
            created_at: Some(Local::now().format(CREATED_AT_FORMAT).to_string()),
        };

        let mut next = guard.clone();
        next.push(poll.clone());
        self.persist(&next).await?;
        *guard = next;
        drop(guard);

        info!(poll_id = %poll.id, "poll created");
        let _ = self.events.send(StoreEvent::PollCreated(poll.clone()));
        Ok(CreatedPoll::stored(poll))
    }

    async fn list_polls(&self) -> Result<Vec<Poll>, PollError> {
        Ok(self.polls.lock().await.clone())
    }

    async fn vote(&self, poll_id: &PollId, option_index: OptionIndex) -> Result<Poll, PollError> {
        let mut guard = self.polls.lock().await;
        let position = guard
            .iter()
            .position(|poll| &poll.id == poll_id)
            .ok_or_else(|| PollError::NotFound(poll_id.clone()))?;

        let mut next = guard.clone();
        next[position].record_vote(option_index);
        let updated = next[position].clone();
        self.persist(&next).await?;
        *guard = next;
        drop(guard);

        info!(
            poll_id = %poll_id,
            option = option_index.as_usize(),
            total_votes = updated.total_votes(),
            "vote recorded"
        );
        let _ = self.events.send(StoreEvent::PollUpdated(updated.clone()));
        Ok(updated)
    }

    async fn cached_polls(&self) -> Vec<Poll> {
        self.polls.lock().await.clone()
    }

    fn subscribe_events(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/local_tests.rs"]
mod tests;
