use super::*;
use shared::domain::{compute_results, PollOption};

fn sample_poll(blue: u64, red: u64, created_at: Option<&str>) -> Poll {
    Poll {
        id: PollId::Numeric(1_760_700_000_000),
        question: "Blue or Red?".into(),
        options: [
            PollOption {
                text: "Blue".into(),
                votes: blue,
            },
            PollOption {
                text: "Red".into(),
                votes: red,
            },
        ],
        created_at: created_at.map(str::to_string),
    }
}

#[test]
fn empty_list_shows_empty_state() {
    assert_eq!(render_poll_list(&[]), format!("{EMPTY_STATE}\n"));
}

#[test]
fn card_shows_question_options_and_metadata() {
    let card = render_poll_card(&sample_poll(3, 1, Some("2026-10-17 09:30:00")));
    assert!(card.starts_with("[1760700000000] Blue or Red?\n"));
    assert!(card.contains("0) Blue"));
    assert!(card.contains("1) Red"));
    assert!(card.contains("Created: 2026-10-17 09:30:00 | Total votes: 4"));
}

#[test]
fn remote_cards_omit_creation_time() {
    let card = render_poll_card(&sample_poll(0, 0, None));
    assert!(!card.contains("Created:"));
    assert!(card.contains("Total votes: 0"));
}

#[test]
fn results_show_counts_percentages_and_bars() {
    let poll = sample_poll(3, 1, None);
    let rendered = render_results(&poll, &compute_results(&poll));
    assert!(rendered.contains("Total Votes: 4"));
    assert!(rendered.contains("Blue  3 votes (75%)"));
    assert!(rendered.contains("Red  1 votes (25%)"));
}

#[test]
fn bar_width_tracks_percentage() {
    assert_eq!(render_bar(0).matches('█').count(), 0);
    assert_eq!(render_bar(50).matches('█').count(), 15);
    assert_eq!(render_bar(75).matches('█').count(), 23);
    assert_eq!(render_bar(100).matches('░').count(), 0);
}

#[test]
fn board_tracks_and_clears_the_open_poll() {
    let poll = sample_poll(1, 1, None);
    let polls = std::slice::from_ref(&poll);
    let mut board = PollBoard::new();
    assert!(board.current_poll(polls).is_none());

    board.show_results(&poll, &compute_results(&poll));
    assert_eq!(board.current_poll(polls), Some(&poll));
    assert!(board.current_poll(&[]).is_none());

    board.clear_results();
    assert!(board.current_poll(polls).is_none());
}
