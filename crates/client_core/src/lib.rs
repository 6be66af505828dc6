use async_trait::async_trait;
use shared::domain::{compute_results, OptionIndex, OptionResult, Poll, PollId};
use tokio::sync::broadcast;

pub mod error;
pub mod local;
pub mod remote;
pub mod types;

pub use error::PollError;
pub use local::{LoadReport, LocalPollStore, DEFAULT_STORAGE_KEY};
pub use remote::RemotePollStore;
pub use types::NewPoll;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Change notifications a store publishes after it has persisted a mutation
/// or refreshed its collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    PollsReplaced(Vec<Poll>),
    PollCreated(Poll),
    PollUpdated(Poll),
}

/// A poll the backend accepted.
#[derive(Debug)]
pub struct CreatedPoll {
    /// The new poll, when the backend's answer identifies it.
    pub poll: Option<Poll>,
    /// Set when the poll was accepted but reloading the collection afterwards failed.
    pub refresh_error: Option<PollError>,
}

impl CreatedPoll {
    fn stored(poll: Poll) -> Self {
        Self {
            poll: Some(poll),
            refresh_error: None,
        }
    }
}

/// Operations every poll backend provides. Implementations are picked when
/// the store is constructed.
#[async_trait]
pub trait PollStore: Send + Sync {
    async fn create_poll(
        &self,
        question: &str,
        option1: &str,
        option2: &str,
    ) -> Result<CreatedPoll, PollError>;

    async fn list_polls(&self) -> Result<Vec<Poll>, PollError>;

    async fn vote(&self, poll_id: &PollId, option_index: OptionIndex) -> Result<Poll, PollError>;

    /// Polls currently held in memory, without touching the backend.
    async fn cached_polls(&self) -> Vec<Poll>;

    fn compute_results(&self, poll: &Poll) -> Vec<OptionResult> {
        compute_results(poll)
    }

    fn subscribe_events(&self) -> broadcast::Receiver<StoreEvent>;
}

fn event_channel() -> broadcast::Sender<StoreEvent> {
    let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
    events
}
