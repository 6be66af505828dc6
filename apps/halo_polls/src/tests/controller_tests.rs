use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::*;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use client_core::{LocalPollStore, RemotePollStore};
use shared::{
    domain::PollOption,
    error::{ApiError, ErrorCode},
    protocol::CreatePollRequest,
};
use storage::LocalStorage;
use tokio::{net::TcpListener, sync::Mutex};

async fn app() -> PollApp {
    let storage = LocalStorage::new("sqlite::memory:").await.expect("db");
    let store = LocalPollStore::open(Arc::new(storage)).await.expect("open");
    PollApp::new(Arc::new(store))
}

async fn only_poll_id(app: &PollApp) -> PollId {
    let polls = app.store.cached_polls().await;
    assert_eq!(polls.len(), 1);
    polls[0].id.clone()
}

async fn open_poll_id(app: &PollApp) -> Option<PollId> {
    let polls = app.store.cached_polls().await;
    app.board.current_poll(&polls).map(|poll| poll.id.clone())
}

#[tokio::test]
async fn submitting_a_poll_notifies_and_rerenders_the_list() {
    let mut app = app().await;
    let outcome = app.submit_poll("Blue or Red?", "Blue", "Red").await;

    assert_eq!(outcome.notices, vec![Notice::poll_created()]);
    assert_eq!(outcome.screens.len(), 1);
    assert!(outcome.screens[0].contains("Blue or Red?"));
}

#[tokio::test]
async fn blank_fields_show_the_fill_in_message() {
    let mut app = app().await;
    let outcome = app.submit_poll("Blue or Red?", " ", "Red").await;

    assert!(outcome.is_error());
    assert_eq!(
        outcome.notices,
        vec![Notice::error("Please fill in all fields to create a poll!")]
    );
    assert!(outcome.screens.is_empty());
    assert!(app.store.cached_polls().await.is_empty());
}

#[tokio::test]
async fn voting_thanks_the_voter_and_opens_results() {
    let mut app = app().await;
    app.submit_poll("Blue or Red?", "Blue", "Red").await;
    let poll_id = only_poll_id(&app).await;

    for _ in 0..3 {
        app.cast_vote(&poll_id, 0).await;
    }
    let outcome = app.cast_vote(&poll_id, 1).await;

    assert_eq!(outcome.notices, vec![Notice::vote_recorded("Red")]);
    let results = outcome.screens.last().expect("results screen");
    assert!(results.contains("Total Votes: 4"));
    assert!(results.contains("Blue  3 votes (75%)"));
    assert!(results.contains("Red  1 votes (25%)"));
    assert_eq!(open_poll_id(&app).await, Some(poll_id));
}

#[tokio::test]
async fn out_of_range_option_is_rejected_before_the_store() {
    let mut app = app().await;
    app.submit_poll("Q?", "A", "B").await;
    let poll_id = only_poll_id(&app).await;

    let outcome = app.cast_vote(&poll_id, 2).await;
    assert!(outcome.is_error());
    assert_eq!(app.store.cached_polls().await[0].total_votes(), 0);
}

#[tokio::test]
async fn voting_on_a_missing_poll_reports_it() {
    let mut app = app().await;
    let outcome = app.cast_vote(&PollId::Numeric(5), 0).await;
    assert_eq!(outcome.notices, vec![Notice::error("Poll 5 does not exist.")]);
}

#[tokio::test]
async fn results_can_be_opened_and_cleared() {
    let mut app = app().await;
    app.submit_poll("Q?", "A", "B").await;
    let poll_id = only_poll_id(&app).await;

    let outcome = app.show_results(&poll_id).await;
    assert!(outcome.notices.is_empty());
    assert!(outcome.screens[0].contains("Total Votes: 0"));
    assert!(outcome.screens[0].contains("A  0 votes (0%)"));

    app.clear_results();
    assert!(open_poll_id(&app).await.is_none());
}

#[tokio::test]
async fn results_accept_the_id_as_typed() {
    let mut app = app().await;
    app.submit_poll("Q?", "A", "B").await;
    let poll_id = only_poll_id(&app).await;

    let typed = PollId::Text(poll_id.to_string());
    let outcome = app.show_results(&typed).await;
    assert!(!outcome.is_error());
    assert_eq!(open_poll_id(&app).await, Some(poll_id));
}

#[tokio::test]
async fn refresh_renders_empty_state_for_new_store() {
    let mut app = app().await;
    let outcome = app.refresh().await;
    assert!(outcome.notices.is_empty());
    assert_eq!(outcome.screens, vec![render_poll_list(&[])]);
}

#[tokio::test]
async fn refresh_keeps_the_open_results_panel_current() {
    let mut app = app().await;
    app.submit_poll("Q?", "A", "B").await;
    let poll_id = only_poll_id(&app).await;
    app.show_results(&poll_id).await;

    let outcome = app.refresh().await;
    assert_eq!(outcome.screens.len(), 2);
    assert!(outcome.screens[1].contains("Total Votes: 0"));
}

#[derive(Clone, Default)]
struct PollService {
    polls: Arc<Mutex<Vec<Poll>>>,
    next_id: Arc<AtomicUsize>,
    reject_creates: Arc<AtomicBool>,
    fail_listing: Arc<AtomicBool>,
}

async fn list_polls(State(service): State<PollService>) -> Response {
    if service.fail_listing.load(Ordering::SeqCst) {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError::new(ErrorCode::Internal, "listing offline")),
        )
            .into_response();
    }
    Json(service.polls.lock().await.clone()).into_response()
}

async fn create_poll(
    State(service): State<PollService>,
    Json(request): Json<CreatePollRequest>,
) -> Response {
    if service.reject_creates.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::new(ErrorCode::Internal, "database unavailable")),
        )
            .into_response();
    }
    let id = service.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
    service.polls.lock().await.push(Poll {
        id: PollId::Numeric(id),
        question: request.question,
        options: request.options,
        created_at: None,
    });
    StatusCode::CREATED.into_response()
}

async fn remote_app() -> (PollApp, PollService) {
    let service = PollService::default();
    let router = Router::new()
        .route("/api/polls", get(list_polls).post(create_poll))
        .with_state(service.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });

    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let store = RemotePollStore::new(&format!("http://{addr}/api")).expect("store");
    (PollApp::new(Arc::new(store)), service)
}

#[tokio::test]
async fn rejected_remote_create_reports_the_service_error() {
    let (mut app, service) = remote_app().await;
    service.polls.lock().await.push(Poll {
        id: PollId::Numeric(7),
        question: "Existing?".into(),
        options: [PollOption::new("Yes"), PollOption::new("No")],
        created_at: None,
    });
    app.refresh().await;
    service.reject_creates.store(true, Ordering::SeqCst);

    let outcome = app.submit_poll("Lunch?", "Pizza", "Salad").await;

    assert!(outcome.is_error());
    assert_eq!(outcome.notices.len(), 1);
    let message = outcome.notices[0].to_string();
    assert!(message.contains("polling service rejected"), "{message}");
    assert!(message.contains("database unavailable"), "{message}");
    assert!(outcome.screens.is_empty());

    let cached = app.store.cached_polls().await;
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].question, "Existing?");
}

#[tokio::test]
async fn remote_create_with_a_failed_reload_still_reports_success() {
    let (mut app, service) = remote_app().await;
    service.fail_listing.store(true, Ordering::SeqCst);

    let outcome = app.submit_poll("Lunch?", "Pizza", "Salad").await;

    assert_eq!(outcome.notices.len(), 2);
    assert_eq!(outcome.notices[0], Notice::poll_created());
    assert!(outcome.notices[1].is_error());
    assert!(outcome.notices[1].to_string().contains("Could not load polls"));
    assert_eq!(service.polls.lock().await.len(), 1);
}
