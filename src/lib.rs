pub mod types;
pub mod config;
pub mod client;
pub mod bracket;
pub mod status;
pub mod workflow;
pub mod net;
pub mod app;
pub mod ui;

use types::*;
use config::*;
use app::App;
use client::ServerClient;
use net::{spawn_api_worker, ApiEvent};

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::fs;
use std::io;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

// ── Entry point ────────────────────────────────────────────────────────

pub fn run() {
    load_env_file();

    // Initialize tracing with daily file output
    let logs_dir = repo_root().join("logs");
    fs::create_dir_all(&logs_dir).ok();
    let file_appender = tracing_appender::rolling::daily(&logs_dir, "console.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();
    info!("Bracket console starting");
    log_env_warnings();

    // Missing config.json is not fatal, the console falls back to defaults.
    if let Err(e) = ensure_config_file() {
        warn!("config write failed: {e}");
    }
    let config = load_config_inner().unwrap_or_else(|e| {
        error!("config load failed: {e}");
        AppConfig::default()
    });
    let client = ServerClient::from_config(&config);
    let (request_tx, event_rx) = spawn_api_worker(client);
    let mut app = App::new(request_tx, &config);
    app.reload_bracket();

    if let Err(e) = run_terminal(&mut app, &event_rx) {
        error!("terminal session failed: {e}");
        eprintln!("{e}");
    }
    info!("Bracket console exiting");
}

// ── Terminal session ───────────────────────────────────────────────────

fn run_terminal(app: &mut App, events: &Receiver<ApiEvent>) -> Result<(), String> {
    enable_raw_mode().map_err(|e| format!("enable raw mode: {e}"))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).map_err(|e| format!("enter alternate screen: {e}"))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(|e| format!("create terminal: {e}"))?;

    let result = event_loop(&mut terminal, app, events);

    disable_raw_mode().map_err(|e| format!("disable raw mode: {e}"))?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .map_err(|e| format!("leave alternate screen: {e}"))?;
    terminal.show_cursor().map_err(|e| format!("show cursor: {e}"))?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &Receiver<ApiEvent>,
) -> Result<(), String> {
    let tick = Duration::from_millis(TICK_INTERVAL_MS);
    let mut last_tick = Instant::now();
    loop {
        // Drain every completed server call before drawing the frame.
        while let Ok(api_event) = events.try_recv() {
            app.on_api_event(api_event, now_ms());
        }
        app.on_tick(now_ms());

        terminal
            .draw(|f| ui::draw(f, app, now_ms()))
            .map_err(|e| format!("draw frame: {e}"))?;

        let timeout = tick.saturating_sub(last_tick.elapsed());
        if event::poll(timeout).map_err(|e| format!("poll input: {e}"))? {
            if let Event::Key(key) = event::read().map_err(|e| format!("read input: {e}"))? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }
        if last_tick.elapsed() >= tick {
            last_tick = Instant::now();
        }
        if app.should_quit {
            return Ok(());
        }
    }
}
