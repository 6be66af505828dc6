use std::fmt::Write as _;

use shared::domain::{OptionResult, Poll, PollId};

const BAR_WIDTH: usize = 30;
pub const EMPTY_STATE: &str = "No polls yet. Create one to get started!";

/// Tracks which poll's results panel is open.
#[derive(Debug, Default)]
pub struct PollBoard {
    current_poll_id: Option<PollId>,
}

impl PollBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_results(&mut self, poll: &Poll, results: &[OptionResult]) -> String {
        self.current_poll_id = Some(poll.id.clone());
        render_results(poll, results)
    }

    pub fn clear_results(&mut self) {
        self.current_poll_id = None;
    }

    /// The open poll, looked up in a fresh copy of the collection.
    pub fn current_poll<'a>(&self, polls: &'a [Poll]) -> Option<&'a Poll> {
        let current = self.current_poll_id.as_ref()?;
        polls.iter().find(|poll| &poll.id == current)
    }
}

pub fn render_poll_list(polls: &[Poll]) -> String {
    if polls.is_empty() {
        return format!("{EMPTY_STATE}\n");
    }
    polls.iter().map(render_poll_card).collect()
}

pub fn render_poll_card(poll: &Poll) -> String {
    let mut card = String::new();
    let _ = writeln!(card, "[{}] {}", poll.id, poll.question);
    let _ = writeln!(
        card,
        "    0) {}    1) {}",
        poll.options[0].text, poll.options[1].text
    );
    match &poll.created_at {
        Some(created_at) => {
            let _ = writeln!(
                card,
                "    Created: {created_at} | Total votes: {}",
                poll.total_votes()
            );
        }
        None => {
            let _ = writeln!(card, "    Total votes: {}", poll.total_votes());
        }
    }
    card
}

pub fn render_results(poll: &Poll, results: &[OptionResult]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", poll.question);
    let _ = writeln!(out, "Total Votes: {}", poll.total_votes());
    for result in results {
        let _ = writeln!(
            out,
            "  {}  {} votes ({}%)",
            result.text, result.votes, result.percentage
        );
        let _ = writeln!(out, "  {}", render_bar(result.percentage));
    }
    out
}

pub fn render_bar(percentage: u32) -> String {
    let filled = (percentage.min(100) as usize * BAR_WIDTH + 50) / 100;
    format!("[{}{}]", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

#[cfg(test)]
#[path = "../tests/render_tests.rs"]
mod tests;
