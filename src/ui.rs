use crate::app::{App, Pane};
use crate::bracket::{BracketView, MatchCell};
use crate::client::value_text;
use crate::status::{self, TournamentPhase};
use crate::workflow::Prompt;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Gauge, Paragraph, Tabs, Wrap};
use ratatui::Frame;

static TABS: &[&str; 3] = &["Bracket", "Players", "Scores"];

pub fn draw(f: &mut Frame, app: &App, now_ms: u64) {
    let area = f.area();
    if area.width <= 10 || area.height <= 10 {
        return;
    }

    let [tab_bar, banner, body, progress, notice, legend] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(2),
        Constraint::Fill(1),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    draw_tabs(f, tab_bar, app);
    draw_banner(f, banner, app);
    match app.pane {
        Pane::Bracket => draw_bracket(f, body, app, now_ms),
        Pane::Players => draw_players(f, body, app),
        Pane::Scores => draw_scores(f, body, app),
    }
    draw_progress(f, progress, &app.view);
    draw_notice(f, notice, app);
    draw_legend(f, legend, app);

    if let Some(prompt) = app.prompts.current() {
        draw_prompt(f, area, prompt);
    }
}

fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, area: Rect, app: &App) {
    let index = match app.pane {
        Pane::Bracket => 0,
        Pane::Players => 1,
        Pane::Scores => 2,
    };
    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::UNDERLINED),
        )
        .select(index);
    f.render_widget(tabs, area);
}

fn draw_banner(f: &mut Frame, area: Rect, app: &App) {
    let Some(banner) = app.banner.as_ref() else {
        f.render_widget(
            Paragraph::new("Fetching tournament status...")
                .style(Style::default().fg(Color::DarkGray)),
            area,
        );
        return;
    };
    let color = match banner.phase {
        TournamentPhase::Running => Color::Green,
        TournamentPhase::Ready => Color::Yellow,
        TournamentPhase::Waiting => Color::Red,
    };
    let launch_hint = if banner.launch_enabled {
        Span::styled("  [t] launch", Style::default().fg(Color::Yellow))
    } else {
        Span::styled("  [t] launch", Style::default().add_modifier(Modifier::DIM))
    };
    let lines = vec![
        Line::from(Span::styled(
            banner.headline.clone(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![Span::raw(banner.player_line.clone()), launch_hint]),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

fn draw_bracket(f: &mut Frame, area: Rect, app: &App, now_ms: u64) {
    if let Some(error) = app.view.error.clone() {
        f.render_widget(
            Paragraph::new(error)
                .style(Style::default().fg(Color::Red))
                .alignment(Alignment::Center),
            area,
        );
        return;
    }
    if app.view.rounds.is_empty() {
        f.render_widget(
            Paragraph::new("No bracket loaded. Press g to fetch.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            area,
        );
        return;
    }

    let count = app.view.rounds.len();
    let columns = Layout::horizontal(vec![Constraint::Ratio(1, count as u32); count]).split(area);
    for (round_idx, round) in app.view.rounds.iter().enumerate() {
        let focused = round_idx == app.cursor.round;
        let border_color = if focused { Color::White } else { Color::DarkGray };
        let block = default_border(border_color).title(format!(" {} ", round.label));
        let inner = block.inner(columns[round_idx]);
        f.render_widget(block, columns[round_idx]);

        let mut lines: Vec<Line> = Vec::new();
        for (match_idx, cell) in round.matches.iter().enumerate() {
            let selected = focused && match_idx == app.cursor.index;
            let flashing = cell
                .match_id
                .is_some_and(|id| app.workflows.is_flashing(id, now_ms));
            lines.extend(cell_lines(cell, selected, flashing));
        }
        f.render_widget(Paragraph::new(lines), inner);
    }
}

fn cell_lines(cell: &MatchCell, selected: bool, flashing: bool) -> Vec<Line<'static>> {
    let mut versus = Style::default();
    if !cell.clickable {
        versus = versus.add_modifier(Modifier::DIM);
    }
    if selected {
        versus = versus.add_modifier(Modifier::REVERSED);
    }
    let mut lines = vec![Line::from(Span::styled(cell.versus_line(), versus))];
    if cell.has_result {
        let result = if flashing {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Green)
        };
        lines.push(Line::from(Span::styled(cell.result_line(), result)));
    }
    lines.push(Line::from(""));
    lines
}

fn draw_players(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Players ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.players.is_empty() {
        f.render_widget(
            Paragraph::new("No players connected.").style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    }

    let mut lines = Vec::with_capacity(app.players.len() + 2);
    lines.push("j/k to move, Enter for profile".to_string());
    lines.push(String::new());
    for (idx, player) in app.players.iter().enumerate() {
        let marker = if idx == app.roster_selected { ">" } else { " " };
        let endpoint = match (player.ip.as_deref(), player.port) {
            (Some(ip), Some(port)) => format!("{ip}:{port}"),
            (Some(ip), None) => ip.to_string(),
            _ => String::new(),
        };
        let joined = player.joined.as_deref().unwrap_or("");
        lines.push(format!(
            "{marker} {:<20} {:<22} {}",
            player.username, endpoint, joined
        ));
    }
    f.render_widget(Paragraph::new(lines.join("\n")), inner);
}

fn draw_scores(f: &mut Frame, area: Rect, app: &App) {
    let [score_area, history_area] =
        Layout::vertical([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(area);

    let score_block = default_border(Color::White).title(" Scores ");
    let score_inner = score_block.inner(score_area);
    f.render_widget(score_block, score_area);

    let history_block = default_border(Color::White).title(" Match history ");
    let history_inner = history_block.inner(history_area);
    f.render_widget(history_block, history_area);

    let Some(payload) = app.scores.as_ref() else {
        let placeholder = Paragraph::new("Loading scores...").style(Style::default().fg(Color::DarkGray));
        f.render_widget(placeholder, score_inner);
        return;
    };

    if payload.scores.is_empty() {
        f.render_widget(
            Paragraph::new("No scores yet.").style(Style::default().fg(Color::DarkGray)),
            score_inner,
        );
    } else {
        let lines: Vec<String> = payload
            .scores
            .iter()
            .map(|(name, score)| format!("{name:<24} {score:>4}"))
            .collect();
        f.render_widget(Paragraph::new(lines.join("\n")), score_inner);
    }

    if payload.history.is_empty() {
        f.render_widget(
            Paragraph::new("No matches played yet.").style(Style::default().fg(Color::DarkGray)),
            history_inner,
        );
    } else {
        let lines: Vec<String> = payload
            .history
            .iter()
            .map(|entry| {
                let when = entry
                    .timestamp
                    .as_deref()
                    .map(status::format_start_time)
                    .unwrap_or_default();
                let winner = entry.winner.as_deref().unwrap_or("pending");
                format!(
                    "{when:<18} {} vs {} ➜ {winner}",
                    entry.player1, entry.player2
                )
            })
            .collect();
        f.render_widget(Paragraph::new(lines.join("\n")), history_inner);
    }
}

fn draw_progress(f: &mut Frame, area: Rect, view: &BracketView) {
    let gauge = Gauge::default()
        .ratio(view.progress_ratio())
        .label(format!("{}%", view.progress_percent()))
        .gauge_style(Style::default().fg(Color::LightGreen))
        .block(default_border(Color::DarkGray).title(format!(
            " Progress ({}/{} rounds) ",
            view.rounds_rendered(),
            view.total_rounds
        )));
    f.render_widget(gauge, area);
}

fn draw_notice(f: &mut Frame, area: Rect, app: &App) {
    let Some(notice) = app.notice.as_ref() else {
        return;
    };
    let color = if notice.is_error { Color::Red } else { Color::Green };
    f.render_widget(
        Paragraph::new(notice.text.clone()).style(Style::default().fg(color)),
        area,
    );
}

fn draw_legend(f: &mut Frame, area: Rect, app: &App) {
    let text = match app.pane {
        Pane::Bracket => {
            "q=quit  Tab=pane  g=reload  t=launch  x=reset  s=status  h/l=round  j/k=match  Enter=select"
        }
        Pane::Players => "q=quit  Tab=pane  j/k=move  Enter=profile",
        Pane::Scores => "q=quit  Tab=pane  1=back to bracket",
    };
    f.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

// ── Prompts ────────────────────────────────────────────────────────────

fn draw_prompt(f: &mut Frame, area: Rect, prompt: &Prompt) {
    match prompt {
        Prompt::ConfirmLaunch {
            player1, player2, ..
        } => {
            let popup = centered_rect(50, 20, area);
            f.render_widget(Clear, popup);
            let block = default_border(Color::Yellow).title(" Start match ");
            let inner = block.inner(popup);
            f.render_widget(block, popup);
            let lines = vec![
                Line::from(format!("Start {player1} vs {player2}?")),
                Line::from(""),
                Line::from(Span::styled(
                    "[y] start   [n] cancel",
                    Style::default().fg(Color::DarkGray),
                )),
            ];
            f.render_widget(
                Paragraph::new(lines)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true }),
                inner,
            );
        }
        Prompt::PickWinner {
            player1,
            player2,
            selected,
            ..
        } => {
            let popup = centered_rect(50, 26, area);
            f.render_widget(Clear, popup);
            let block = default_border(Color::Yellow).title(" Declare winner ");
            let inner = block.inner(popup);
            f.render_widget(block, popup);
            let option = |idx: usize, name: &str| {
                let style = if *selected == idx {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default()
                };
                Line::from(Span::styled(format!("{}. {name}", idx + 1), style))
            };
            let lines = vec![
                Line::from("Who won?"),
                Line::from(""),
                option(0, player1),
                option(1, player2),
                Line::from(""),
                Line::from(Span::styled(
                    "[Enter] confirm   [Esc] cancel",
                    Style::default().fg(Color::DarkGray),
                )),
            ];
            f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
        }
        Prompt::ConfirmReset => {
            let popup = centered_rect(50, 20, area);
            f.render_widget(Clear, popup);
            let block = default_border(Color::Red).title(" Reset tournament ");
            let inner = block.inner(popup);
            f.render_widget(block, popup);
            let lines = vec![
                Line::from("Reset the tournament and clear the bracket?"),
                Line::from(""),
                Line::from(Span::styled(
                    "[y] reset   [n] cancel",
                    Style::default().fg(Color::DarkGray),
                )),
            ];
            f.render_widget(
                Paragraph::new(lines)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true }),
                inner,
            );
        }
        Prompt::PlayerProfile { username, profile } => {
            let popup = centered_rect(60, 60, area);
            f.render_widget(Clear, popup);
            let block = default_border(Color::White).title(" Player profile ");
            let inner = block.inner(popup);
            f.render_widget(block, popup);
            let Some(profile) = profile.as_ref() else {
                f.render_widget(
                    Paragraph::new(format!("Loading {username}..."))
                        .style(Style::default().fg(Color::DarkGray))
                        .alignment(Alignment::Center),
                    inner,
                );
                return;
            };
            let mut lines = vec![
                Line::from(Span::styled(
                    profile.name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(format!(
                    "Wins: {}   Losses: {}   Avg time: {}",
                    profile.wins,
                    profile.losses,
                    value_text(&profile.avg_time)
                )),
                Line::from(""),
                Line::from("Recent matches:"),
            ];
            for entry in profile.history.iter().take(10) {
                let style = match entry.result.as_str() {
                    "win" => Style::default().fg(Color::Green),
                    "loss" => Style::default().fg(Color::Red),
                    _ => Style::default(),
                };
                lines.push(Line::from(Span::styled(
                    format!("  vs {:<20} {}", entry.opponent, entry.result),
                    style,
                )));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "[Esc] close",
                Style::default().fg(Color::DarkGray),
            )));
            f.render_widget(Paragraph::new(lines), inner);
        }
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
