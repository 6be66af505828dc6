use super::*;

fn poll_with_votes(first: u64, second: u64) -> Poll {
    Poll {
        id: PollId::Numeric(1_700_000_000_000),
        question: "Blue or Red?".into(),
        options: [
            PollOption {
                text: "Blue".into(),
                votes: first,
            },
            PollOption {
                text: "Red".into(),
                votes: second,
            },
        ],
        created_at: None,
    }
}

#[test]
fn results_are_zero_when_nobody_voted() {
    let results = compute_results(&poll_with_votes(0, 0));
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|result| result.percentage == 0));
}

#[test]
fn three_to_one_splits_seventy_five_twenty_five() {
    let results = compute_results(&poll_with_votes(3, 1));
    assert_eq!(results[0].percentage, 75);
    assert_eq!(results[1].percentage, 25);
    assert_eq!(results[0].votes, 3);
    assert_eq!(results[1].text, "Red");
}

#[test]
fn rounding_drift_is_not_corrected() {
    // 1/3 -> 33, 2/3 -> 67; 1/8 -> 13 (12.5 rounds up), 7/8 -> 88.
    let thirds = compute_results(&poll_with_votes(1, 2));
    assert_eq!((thirds[0].percentage, thirds[1].percentage), (33, 67));

    let eighths = compute_results(&poll_with_votes(1, 7));
    assert_eq!((eighths[0].percentage, eighths[1].percentage), (13, 88));
}

#[test]
fn record_vote_touches_only_the_addressed_option() {
    let mut poll = poll_with_votes(2, 5);
    poll.record_vote(OptionIndex::Second);
    assert_eq!(poll.options[0].votes, 2);
    assert_eq!(poll.options[1].votes, 6);
    assert_eq!(poll.total_votes(), 8);
}

#[test]
fn option_index_rejects_anything_past_two() {
    assert_eq!(OptionIndex::try_from(0), Ok(OptionIndex::First));
    assert_eq!(OptionIndex::try_from(1), Ok(OptionIndex::Second));
    assert_eq!(OptionIndex::try_from(2), Err(OptionIndexOutOfRange(2)));
}

#[test]
fn serialized_record_carries_derived_total() {
    let value = serde_json::to_value(poll_with_votes(3, 1)).expect("serialize");
    assert_eq!(value["totalVotes"], 4);
    assert_eq!(value["id"], 1_700_000_000_000_i64);
    assert!(value.get("createdAt").is_none());
}

#[test]
fn stale_stored_total_is_ignored_on_read() {
    let raw = r#"{
        "id": 42,
        "question": "Tea or coffee?",
        "options": [{"text": "Tea", "votes": 2}, {"text": "Coffee", "votes": 1}],
        "totalVotes": 99,
        "createdAt": "2026-10-17 09:30:00"
    }"#;
    let poll: Poll = serde_json::from_str(raw).expect("decode");
    assert_eq!(poll.id, PollId::Numeric(42));
    assert_eq!(poll.total_votes(), 3);
    assert_eq!(poll.created_at.as_deref(), Some("2026-10-17 09:30:00"));
}

#[test]
fn server_assigned_string_ids_are_accepted() {
    let raw = r#"{"pollID": "a1b2", "question": "Q", "options": [{"text": "A", "votes": 0}, {"text": "B", "votes": 0}]}"#;
    let poll: Poll = serde_json::from_str(raw).expect("decode");
    assert_eq!(poll.id, PollId::Text("a1b2".into()));
    assert_eq!(poll.id.to_string(), "a1b2");
}

#[test]
fn records_with_three_options_are_rejected() {
    let raw = r#"{"id": 1, "question": "Q", "options": [{"text": "A"}, {"text": "B"}, {"text": "C"}]}"#;
    assert!(serde_json::from_str::<Poll>(raw).is_err());
}

#[test]
fn poll_id_from_text_prefers_numeric_form() {
    assert_eq!(PollId::from(" 17 "), PollId::Numeric(17));
    assert_eq!(PollId::from("abc"), PollId::Text("abc".into()));
}

#[test]
fn vote_request_uses_camel_case_index() {
    let body = serde_json::to_string(&crate::protocol::VoteRequest {
        option_index: OptionIndex::Second,
    })
    .expect("serialize");
    assert_eq!(body, r#"{"optionIndex":1}"#);
}

#[test]
fn numeric_and_string_ids_with_the_same_digits_are_equal() {
    use std::collections::HashSet;

    let typed = PollId::from("42");
    let served = PollId::Text("42".into());
    assert_eq!(typed, PollId::Numeric(42));
    assert_eq!(typed, served);
    assert_ne!(PollId::Numeric(42), PollId::Text("042".into()));

    let ids: HashSet<PollId> = [typed, served].into_iter().collect();
    assert_eq!(ids.len(), 1);
}
