use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use shared::{
    domain::{OptionIndex, Poll, PollId},
    error::ApiError,
    protocol::VoteRequest,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};
use url::Url;

use crate::{event_channel, CreatedPoll, NewPoll, PollError, PollStore, StoreEvent};

/// Poll store backed by a polling HTTP service. The in-memory collection is
/// only a snapshot of the service's state.
pub struct RemotePollStore {
    http: Client,
    base_url: Url,
    polls: Mutex<Vec<Poll>>,
    events: broadcast::Sender<StoreEvent>,
}

impl RemotePollStore {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> anyhow::Result<Self> {
        let base_url = parse_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            polls: Mutex::new(Vec::new()),
            events: event_channel(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // parse_base_url rejects cannot-be-a-base urls, so segments are always available.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(
        &self,
        request: RequestBuilder,
        action: &'static str,
    ) -> Result<Response, PollError> {
        debug!(action, "request sending");
        let response = request.send().await.map_err(|e| {
            warn!(action, error = %e, "request failed before a response arrived");
            PollError::ServerRejected(format!("{action} failed: {e}"))
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(action, %status, "request succeeded");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ApiError>(&body)
            .ok()
            .map(|api_error| api_error.message)
            .filter(|message| !message.is_empty());
        warn!(action, %status, detail = detail.as_deref().unwrap_or(""), "request rejected");
        Err(PollError::ServerRejected(match detail {
            Some(detail) => format!("{action} failed with status {status}: {detail}"),
            None => format!("{action} failed with status {status}"),
        }))
    }

    async fn replace_cache(&self, polls: Vec<Poll>) {
        *self.polls.lock().await = polls.clone();
        let _ = self.events.send(StoreEvent::PollsReplaced(polls));
    }
}

fn parse_base_url(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| anyhow::anyhow!("invalid polling service url '{raw}': {e}"))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(anyhow::anyhow!(
            "polling service url must be an http(s) base url, got '{raw}'"
        ));
    }
    Ok(url)
}

/// The service's vote response replaces the cached poll wholesale, so it is
/// checked before it is trusted.
fn validate_vote_response(
    requested: &PollId,
    cached: Option<&Poll>,
    updated: &Poll,
) -> Result<(), PollError> {
    if &updated.id != requested {
        return Err(PollError::ServerRejected(format!(
            "vote response describes poll {} instead of {requested}",
            updated.id
        )));
    }
    if let Some(cached) = cached {
        let regressed = cached
            .options
            .iter()
            .zip(updated.options.iter())
            .any(|(before, after)| after.votes < before.votes);
        if regressed {
            return Err(PollError::ServerRejected(format!(
                "vote response for poll {requested} lowers an existing vote count"
            )));
        }
    }
    Ok(())
}

fn matches_submission(poll: &Poll, input: &NewPoll) -> bool {
    poll.question == input.question
        && poll.options[0].text == input.option1
        && poll.options[1].text == input.option2
}

#[async_trait]
impl PollStore for RemotePollStore {
    async fn create_poll(
        &self,
        question: &str,
        option1: &str,
        option2: &str,
    ) -> Result<CreatedPoll, PollError> {
        let input = NewPoll::parse(question, option1, option2)?;

        let request = self
            .http
            .post(self.endpoint(&["polls"]))
            .json(&input.to_request());
        let response = self.send(request, "create poll").await?;
        let echoed = response
            .bytes()
            .await
            .ok()
            .and_then(|body| serde_json::from_slice::<Poll>(&body).ok());

        // The service has the poll from here on; a failed reload only leaves the cache stale.
        let (polls, refresh_error) = match self.list_polls().await {
            Ok(polls) => (polls, None),
            Err(error) => {
                warn!(%error, "poll created but the poll listing could not be reloaded");
                (Vec::new(), Some(error))
            }
        };
        let poll = echoed.or_else(|| {
            polls
                .iter()
                .rev()
                .find(|poll| matches_submission(poll, &input))
                .cloned()
        });

        match &poll {
            Some(created) => {
                info!(poll_id = %created.id, "poll created remotely");
                let _ = self.events.send(StoreEvent::PollCreated(created.clone()));
            }
            None => info!("poll created remotely; the service did not say which poll it is"),
        }
        Ok(CreatedPoll {
            poll,
            refresh_error,
        })
    }

    async fn list_polls(&self) -> Result<Vec<Poll>, PollError> {
        let request = self.http.get(self.endpoint(&["polls"]));
        let polls: Vec<Poll> = self
            .send(request, "list polls")
            .await?
            .json()
            .await
            .map_err(|e| PollError::ServerRejected(format!("malformed poll listing: {e}")))?;

        debug!(polls = polls.len(), "poll cache refreshed");
        self.replace_cache(polls.clone()).await;
        Ok(polls)
    }

    async fn vote(&self, poll_id: &PollId, option_index: OptionIndex) -> Result<Poll, PollError> {
        let id_segment = poll_id.to_string();
        let request = self
            .http
            .post(self.endpoint(&["polls", id_segment.as_str(), "vote"]))
            .json(&VoteRequest { option_index });
        let updated: Poll = self
            .send(request, "cast vote")
            .await?
            .json()
            .await
            .map_err(|e| PollError::ServerRejected(format!("malformed vote response: {e}")))?;

        {
            let mut guard = self.polls.lock().await;
            let position = guard.iter().position(|poll| &poll.id == poll_id);
            validate_vote_response(poll_id, position.map(|i| &guard[i]), &updated)?;
            match position {
                Some(i) => guard[i] = updated.clone(),
                None => guard.push(updated.clone()),
            }
        }

        info!(
            poll_id = %poll_id,
            option = option_index.as_usize(),
            total_votes = updated.total_votes(),
            "vote accepted by service"
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
#[path = "tests/remote_tests.rs"]
mod tests;
