use crate::bracket::{self, BracketView, MatchCell};
use crate::client::ApiError;
use crate::config::status_poll_interval_ms;
use crate::net::{ApiEvent, ApiRequest};
use crate::status::{self, StatusBanner};
use crate::types::*;
use crate::workflow::{MatchWorkflows, Prompt, PromptCoordinator};
use crossterm::event::{KeyCode, KeyEvent};
use std::sync::mpsc::Sender;
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pane {
    Bracket,
    Players,
    Scores,
}

#[derive(Clone, Debug)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BracketCursor {
    pub round: usize,
    pub index: usize,
}

pub struct App {
    pub pane: Pane,
    pub view: BracketView,
    pub workflows: MatchWorkflows,
    pub prompts: PromptCoordinator,
    pub banner: Option<StatusBanner>,
    pub players: Vec<PlayerEntry>,
    pub scores: Option<ScoresHistoryPayload>,
    pub notice: Option<Notice>,
    pub cursor: BracketCursor,
    pub roster_selected: usize,
    pub should_quit: bool,
    request_tx: Sender<ApiRequest>,
    status_poll_ms: u64,
    next_status_poll_ms: u64,
}

impl App {
    pub fn new(request_tx: Sender<ApiRequest>, config: &AppConfig) -> Self {
        App {
            pane: Pane::Bracket,
            view: BracketView::default(),
            workflows: MatchWorkflows::new(),
            prompts: PromptCoordinator::default(),
            banner: None,
            players: Vec::new(),
            scores: None,
            notice: None,
            cursor: BracketCursor::default(),
            roster_selected: 0,
            should_quit: false,
            request_tx,
            status_poll_ms: status_poll_interval_ms(config),
            next_status_poll_ms: 0,
        }
    }

    // ── Requests ───────────────────────────────────────────────────────

    fn send(&self, request: ApiRequest) {
        if self.request_tx.send(request).is_err() {
            warn!("api worker is gone; request dropped");
        }
    }

    pub fn reload_bracket(&self) {
        self.send(ApiRequest::LoadBracket);
    }

    pub fn refresh_status(&self) {
        self.send(ApiRequest::RefreshStatus);
    }

    pub fn load_players(&self) {
        self.send(ApiRequest::LoadPlayers);
    }

    pub fn load_scores(&self) {
        self.send(ApiRequest::LoadScores);
    }

    pub fn launch_tournament(&mut self) {
        let enabled = self
            .banner
            .as_ref()
            .is_some_and(|banner| banner.launch_enabled);
        if !enabled {
            self.set_error("⛔ Launch is disabled: already running or not enough players.");
            return;
        }
        self.send(ApiRequest::StartTournament);
    }

    // ── Input ──────────────────────────────────────────────────────────

    pub fn on_key(&mut self, key: KeyEvent) {
        self.notice = None;
        if self.prompts.is_open() {
            self.on_prompt_key(key);
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.next_pane(),
            KeyCode::Char('1') => self.switch_pane(Pane::Bracket),
            KeyCode::Char('2') => self.switch_pane(Pane::Players),
            KeyCode::Char('3') => self.switch_pane(Pane::Scores),
            KeyCode::Char('g') => self.reload_bracket(),
            KeyCode::Char('t') => self.launch_tournament(),
            KeyCode::Char('x') => self.prompts.open(Prompt::ConfirmReset),
            KeyCode::Char('s') => self.refresh_status(),
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(-1, 0),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(1, 0),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(0, -1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(0, 1),
            KeyCode::Enter => self.activate_selection(),
            _ => {}
        }
    }

    fn on_prompt_key(&mut self, key: KeyEvent) {
        let Some(prompt) = self.prompts.current().cloned() else {
            return;
        };
        match prompt {
            Prompt::ConfirmLaunch {
                match_id,
                player1,
                player2,
            } => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    self.prompts.close();
                    match self.workflows.begin_launch(match_id) {
                        Ok(()) => self.send(ApiRequest::StartMatch {
                            match_id,
                            player1,
                            player2,
                        }),
                        Err(err) => self.set_error(&err),
                    }
                }
                KeyCode::Char('n') | KeyCode::Esc => {
                    self.prompts.close();
                    self.workflows.dismiss(match_id);
                }
                _ => {}
            },
            Prompt::PickWinner {
                match_id,
                player1,
                player2,
                selected,
            } => match key.code {
                KeyCode::Up
                | KeyCode::Down
                | KeyCode::Left
                | KeyCode::Right
                | KeyCode::Char('j')
                | KeyCode::Char('k')
                | KeyCode::Char('h')
                | KeyCode::Char('l') => {
                    if let Some(Prompt::PickWinner { selected, .. }) = self.prompts.current_mut() {
                        *selected = 1 - *selected;
                    }
                }
                KeyCode::Char('1') => self.submit_winner(match_id, player1, player2),
                KeyCode::Char('2') => self.submit_winner(match_id, player2, player1),
                KeyCode::Enter => {
                    if selected == 0 {
                        self.submit_winner(match_id, player1, player2);
                    } else {
                        self.submit_winner(match_id, player2, player1);
                    }
                }
                KeyCode::Esc => {
                    self.prompts.close();
                    self.workflows.dismiss(match_id);
                }
                _ => {}
            },
            Prompt::ConfirmReset => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    self.prompts.close();
                    self.send(ApiRequest::ResetTournament);
                }
                KeyCode::Char('n') | KeyCode::Esc => {
                    self.prompts.close();
                }
                _ => {}
            },
            Prompt::PlayerProfile { .. } => match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {
                    self.prompts.close();
                }
                _ => {}
            },
        }
    }

    /// The winner prompt stays open until the server confirms the result,
    /// so a failed request leaves the operator exactly where they were.
    fn submit_winner(&mut self, match_id: u64, winner: String, loser: String) {
        self.send(ApiRequest::ReportResult {
            match_id,
            winner,
            loser,
        });
    }

    fn move_cursor(&mut self, dx: i64, dy: i64) {
        match self.pane {
            Pane::Bracket => {
                if self.view.rounds.is_empty() {
                    return;
                }
                let last_round = self.view.rounds.len() as i64 - 1;
                let round = (self.cursor.round as i64 + dx).clamp(0, last_round) as usize;
                let matches = self.view.rounds[round].matches.len();
                if matches == 0 {
                    self.cursor = BracketCursor { round, index: 0 };
                    return;
                }
                let index = (self.cursor.index as i64 + dy).clamp(0, matches as i64 - 1) as usize;
                self.cursor = BracketCursor { round, index };
            }
            Pane::Players => {
                if self.players.is_empty() {
                    return;
                }
                let last = self.players.len() as i64 - 1;
                self.roster_selected = (self.roster_selected as i64 + dy).clamp(0, last) as usize;
            }
            Pane::Scores => {}
        }
    }

    fn activate_selection(&mut self) {
        match self.pane {
            Pane::Bracket => {
                let Some(cell) = self.selected_cell().cloned() else {
                    return;
                };
                if !cell.clickable {
                    return;
                }
                if let Err(err) = self.workflows.activate(&cell, &mut self.prompts) {
                    self.set_error(&err);
                }
            }
            Pane::Players => {
                let Some(player) = self.players.get(self.roster_selected) else {
                    return;
                };
                let username = player.username.clone();
                self.prompts.open(Prompt::PlayerProfile {
                    username: username.clone(),
                    profile: None,
                });
                self.send(ApiRequest::LoadProfile { username });
            }
            Pane::Scores => {}
        }
    }

    pub fn selected_cell(&self) -> Option<&MatchCell> {
        self.view
            .rounds
            .get(self.cursor.round)?
            .matches
            .get(self.cursor.index)
    }

    fn next_pane(&mut self) {
        let next = match self.pane {
            Pane::Bracket => Pane::Players,
            Pane::Players => Pane::Scores,
            Pane::Scores => Pane::Bracket,
        };
        self.switch_pane(next);
    }

    /// Pane data is server-resident and fetched fresh on every switch.
    fn switch_pane(&mut self, pane: Pane) {
        self.pane = pane;
        match pane {
            Pane::Players => self.load_players(),
            Pane::Scores => self.load_scores(),
            Pane::Bracket => {}
        }
    }

    // ── Server responses ───────────────────────────────────────────────

    pub fn on_api_event(&mut self, event: ApiEvent, now_ms: u64) {
        match event {
            ApiEvent::Bracket(Ok(document)) => {
                self.view = bracket::render(&document);
                self.workflows.reset_from_view(&self.view);
                if self.prompts.current().and_then(Prompt::match_id).is_some() {
                    self.prompts.close();
                }
                self.clamp_cursor();
                if let Some(error) = self.view.error.clone() {
                    self.set_error(&error);
                }
            }
            ApiEvent::Bracket(Err(err)) => {
                self.report_failure("Failed to load bracket data.", &err);
            }
            ApiEvent::Status(Ok(payload)) => {
                self.banner = Some(status::banner_from_status(&payload));
            }
            ApiEvent::Status(Err(err)) => {
                self.report_failure("Failed to refresh tournament status.", &err);
            }
            ApiEvent::TournamentStarted(Ok(())) => {
                self.set_notice("🚀 Tournament successfully launched!");
                self.reload_bracket();
                self.refresh_status();
            }
            ApiEvent::TournamentStarted(Err(err)) => {
                self.report_failure("Failed to start the tournament.", &err);
            }
            ApiEvent::TournamentReset(Ok(())) => {
                self.set_notice("⛔ Tournament has been reset.");
                self.view = BracketView::default();
                self.workflows.clear();
                self.cursor = BracketCursor::default();
                if self.prompts.current().and_then(Prompt::match_id).is_some() {
                    self.prompts.close();
                }
                self.refresh_status();
            }
            ApiEvent::TournamentReset(Err(err)) => {
                self.report_failure("Failed to reset the tournament.", &err);
            }
            ApiEvent::MatchStarted {
                match_id,
                result: Ok(()),
            } => match self.workflows.launch_succeeded(match_id) {
                Ok(()) => {
                    if let Some(cell) = self.view.find_cell(match_id).cloned() {
                        self.prompts.open(Prompt::PickWinner {
                            match_id,
                            player1: cell.player1,
                            player2: cell.player2,
                            selected: 0,
                        });
                    }
                }
                Err(err) => warn!("dropping stale launch completion for match {match_id}: {err}"),
            },
            ApiEvent::MatchStarted {
                match_id,
                result: Err(err),
            } => {
                self.workflows.launch_failed(match_id);
                self.report_failure("Failed to start the match.", &err);
            }
            ApiEvent::ResultRecorded {
                match_id,
                winner,
                result: Ok(()),
            } => match self.workflows.result_recorded(match_id, now_ms) {
                Ok(()) => {
                    self.view.apply_winner(match_id, &winner);
                    if self.prompts.current().and_then(Prompt::match_id) == Some(match_id) {
                        self.prompts.close();
                    }
                    self.set_notice("✅ Result recorded.");
                }
                Err(err) => warn!("dropping stale result completion for match {match_id}: {err}"),
            },
            ApiEvent::ResultRecorded {
                result: Err(err), ..
            } => {
                // cell stays awaiting-winner and the prompt stays open
                self.report_failure("Failed to record the match result.", &err);
            }
            ApiEvent::Players(Ok(players)) => {
                self.players = players;
                if self.roster_selected >= self.players.len() {
                    self.roster_selected = self.players.len().saturating_sub(1);
                }
            }
            ApiEvent::Players(Err(err)) => {
                self.report_failure("Failed to load players.", &err);
            }
            ApiEvent::Scores(Ok(payload)) => {
                self.scores = Some(payload);
            }
            ApiEvent::Scores(Err(err)) => {
                self.report_failure("Failed to load scores and history.", &err);
            }
            ApiEvent::Profile {
                username,
                result: Ok(profile),
            } => {
                if let Some(Prompt::PlayerProfile {
                    username: open_username,
                    profile: slot,
                }) = self.prompts.current_mut()
                {
                    if *open_username == username {
                        *slot = Some(profile);
                    }
                }
            }
            ApiEvent::Profile {
                result: Err(err), ..
            } => {
                if matches!(self.prompts.current(), Some(Prompt::PlayerProfile { .. })) {
                    self.prompts.close();
                }
                self.report_failure("Failed to load player profile.", &err);
            }
        }
    }

    pub fn on_tick(&mut self, now_ms: u64) {
        if now_ms >= self.next_status_poll_ms {
            self.refresh_status();
            self.next_status_poll_ms = now_ms + self.status_poll_ms;
        }
    }

    // ── Notices ────────────────────────────────────────────────────────

    fn set_notice(&mut self, text: &str) {
        self.notice = Some(Notice {
            text: text.to_string(),
            is_error: false,
        });
    }

    fn set_error(&mut self, text: &str) {
        self.notice = Some(Notice {
            text: text.to_string(),
            is_error: true,
        });
    }

    /// Server-reported errors surface with the server's own message; every
    /// other failure shows the operation fallback and logs the detail.
    fn report_failure(&mut self, fallback: &str, err: &ApiError) {
        warn!("{err}");
        match err.server_message() {
            Some(message) => {
                let text = format!("Error: {message}");
                self.set_error(&text);
            }
            None => self.set_error(fallback),
        }
    }

    fn clamp_cursor(&mut self) {
        let last_round = self.view.rounds.len().saturating_sub(1);
        self.cursor.round = self.cursor.round.min(last_round);
        let matches = self
            .view
            .rounds
            .get(self.cursor.round)
            .map(|round| round.matches.len())
            .unwrap_or(0);
        self.cursor.index = self.cursor.index.min(matches.saturating_sub(1));
    }
}
