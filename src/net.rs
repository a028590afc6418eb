use crate::client::{ApiError, ServerClient};
use crate::types::{BracketDocument, PlayerEntry, PlayerProfile, ScoresHistoryPayload, StatusPayload};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use tracing::debug;

/// One intent per server call the console can make.
#[derive(Clone, Debug, PartialEq)]
pub enum ApiRequest {
    LoadBracket,
    RefreshStatus,
    StartTournament,
    ResetTournament,
    StartMatch {
        match_id: u64,
        player1: String,
        player2: String,
    },
    ReportResult {
        match_id: u64,
        winner: String,
        loser: String,
    },
    LoadPlayers,
    LoadScores,
    LoadProfile {
        username: String,
    },
}

/// Completion of one request. Match-scoped completions carry the match id
/// so the app can recognize answers that outlived a bracket reload.
#[derive(Debug)]
pub enum ApiEvent {
    Bracket(Result<BracketDocument, ApiError>),
    Status(Result<StatusPayload, ApiError>),
    TournamentStarted(Result<(), ApiError>),
    TournamentReset(Result<(), ApiError>),
    MatchStarted {
        match_id: u64,
        result: Result<(), ApiError>,
    },
    ResultRecorded {
        match_id: u64,
        winner: String,
        result: Result<(), ApiError>,
    },
    Players(Result<Vec<PlayerEntry>, ApiError>),
    Scores(Result<ScoresHistoryPayload, ApiError>),
    Profile {
        username: String,
        result: Result<PlayerProfile, ApiError>,
    },
}

/// Runs every server call on a single background thread so the draw loop
/// never blocks on the network. Requests execute in submission order and
/// nothing is cancelled; a late completion is delivered like any other.
pub fn spawn_api_worker(client: ServerClient) -> (Sender<ApiRequest>, Receiver<ApiEvent>) {
    let (request_tx, request_rx) = mpsc::channel::<ApiRequest>();
    let (event_tx, event_rx) = mpsc::channel::<ApiEvent>();
    thread::spawn(move || {
        while let Ok(request) = request_rx.recv() {
            debug!("api request: {request:?}");
            let event = execute_request(&client, request);
            if event_tx.send(event).is_err() {
                break;
            }
        }
    });
    (request_tx, event_rx)
}

fn execute_request(client: &ServerClient, request: ApiRequest) -> ApiEvent {
    match request {
        ApiRequest::LoadBracket => ApiEvent::Bracket(client.fetch_bracket()),
        ApiRequest::RefreshStatus => ApiEvent::Status(client.fetch_status()),
        ApiRequest::StartTournament => ApiEvent::TournamentStarted(client.start_tournament()),
        ApiRequest::ResetTournament => ApiEvent::TournamentReset(client.reset_tournament()),
        ApiRequest::StartMatch {
            match_id,
            player1,
            player2,
        } => ApiEvent::MatchStarted {
            match_id,
            result: client.start_match(&player1, &player2, match_id),
        },
        ApiRequest::ReportResult {
            match_id,
            winner,
            loser,
        } => ApiEvent::ResultRecorded {
            match_id,
            result: client.report_result(&winner, &loser),
            winner,
        },
        ApiRequest::LoadPlayers => ApiEvent::Players(client.fetch_players()),
        ApiRequest::LoadScores => ApiEvent::Scores(client.fetch_scores_history()),
        ApiRequest::LoadProfile { username } => ApiEvent::Profile {
            result: client.fetch_player_profile(&username),
            username,
        },
    }
}
