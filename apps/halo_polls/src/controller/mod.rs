//! Controller layer: turns user actions into store operations and collects
//! what the terminal should show next.

pub mod events;

use std::sync::Arc;

use client_core::{PollError, PollStore, StoreEvent};
use shared::domain::{OptionIndex, Poll, PollId};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, warn};

use crate::ui::{render_poll_list, PollBoard};
use events::{ActionContext, Notice};

/// What an action produced: notifications in the order they happened plus any
/// screens to print.
#[derive(Debug, Default)]
pub struct Outcome {
    pub notices: Vec<Notice>,
    pub screens: Vec<String>,
}

impl Outcome {
    fn notice(notice: Notice) -> Self {
        Self {
            notices: vec![notice],
            screens: Vec::new(),
        }
    }

    fn screen(screen: String) -> Self {
        Self {
            notices: Vec::new(),
            screens: vec![screen],
        }
    }

    pub fn is_error(&self) -> bool {
        self.notices.iter().any(Notice::is_error)
    }
}

pub struct PollApp {
    store: Arc<dyn PollStore>,
    board: PollBoard,
    events: broadcast::Receiver<StoreEvent>,
}

impl PollApp {
    pub fn new(store: Arc<dyn PollStore>) -> Self {
        let events = store.subscribe_events();
        Self {
            store,
            board: PollBoard::new(),
            events,
        }
    }

    /// Loads the collection from the backend and renders the list.
    pub async fn refresh(&mut self) -> Outcome {
        match self.store.list_polls().await {
            Ok(polls) => {
                self.drain_events();
                let mut outcome = Outcome::screen(render_poll_list(&polls));
                if let Some(open) = self.board.current_poll(&polls).cloned() {
                    outcome.screens.push(self.open_results(&open));
                }
                outcome
            }
            Err(error) => Outcome::notice(Notice::from_error(ActionContext::Refresh, &error)),
        }
    }

    pub async fn submit_poll(&mut self, question: &str, option1: &str, option2: &str) -> Outcome {
        match self.store.create_poll(question, option1, option2).await {
            Ok(created) => {
                if let Some(poll) = &created.poll {
                    debug!(poll_id = %poll.id, "poll submitted");
                }
                let mut outcome = Outcome::notice(Notice::poll_created());
                if let Some(error) = &created.refresh_error {
                    warn!(%error, "poll list is stale after creating a poll");
                    outcome
                        .notices
                        .push(Notice::from_error(ActionContext::Refresh, error));
                }
                outcome.screens.extend(self.rerender_if_changed().await);
                outcome
            }
            Err(error) => self.failed(ActionContext::CreatePoll, error),
        }
    }

    pub async fn cast_vote(&mut self, poll_id: &PollId, option_index: usize) -> Outcome {
        let option_index = match OptionIndex::try_from(option_index) {
            Ok(index) => index,
            Err(error) => return self.failed(ActionContext::Vote, error.into()),
        };

        match self.store.vote(poll_id, option_index).await {
            Ok(poll) => {
                let option_text = poll.option(option_index).text.clone();
                let mut outcome = Outcome::notice(Notice::vote_recorded(&option_text));
                outcome.screens.extend(self.rerender_if_changed().await);
                outcome.screens.push(self.open_results(&poll));
                outcome
            }
            Err(error) => self.failed(ActionContext::Vote, error),
        }
    }

    pub async fn show_results(&mut self, poll_id: &PollId) -> Outcome {
        let mut polls = self.store.cached_polls().await;
        if !polls.iter().any(|poll| &poll.id == poll_id) {
            match self.store.list_polls().await {
                Ok(fresh) => polls = fresh,
                Err(error) => return self.failed(ActionContext::Results, error),
            }
        }

        match polls.iter().find(|poll| &poll.id == poll_id) {
            Some(poll) => Outcome::screen(self.open_results(poll)),
            None => self.failed(ActionContext::Results, PollError::NotFound(poll_id.clone())),
        }
    }

    pub fn clear_results(&mut self) {
        self.board.clear_results();
    }

    pub async fn render_list(&self) -> String {
        render_poll_list(&self.store.cached_polls().await)
    }

    fn open_results(&mut self, poll: &Poll) -> String {
        let results = self.store.compute_results(poll);
        self.board.show_results(poll, &results)
    }

    fn failed(&self, context: ActionContext, error: PollError) -> Outcome {
        warn!(?context, %error, "action failed");
        Outcome::notice(Notice::from_error(context, &error))
    }

    /// Re-renders the list when the store announced a change since the last look.
    async fn rerender_if_changed(&mut self) -> Option<String> {
        if self.drain_events() == 0 {
            return None;
        }
        Some(self.render_list().await)
    }

    fn drain_events(&mut self) -> usize {
        let mut received = 0;
        loop {
            match self.events.try_recv() {
                Ok(_) => received += 1,
                Err(TryRecvError::Lagged(skipped)) => received += skipped as usize,
                Err(TryRecvError::Empty | TryRecvError::Closed) => return received,
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/controller_tests.rs"]
mod tests;
