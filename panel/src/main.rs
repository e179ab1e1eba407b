mod api;
mod catalog;
mod commands;
mod config;
mod notice;
mod poller;
mod state;
mod ui;
mod view;

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::api::ApiClient;
use crate::commands::CommandContext;
use crate::config::Config;
use crate::state::DashboardState;
use crate::view::build_cards;

#[derive(Parser)]
#[command(name = "botpanel", about = "Terminal control panel for a fleet of trading bots")]
struct Cli {
    /// Backend base URL (overrides PANEL_SERVER_URL)
    #[arg(long)]
    server: Option<String>,

    /// Poll interval in seconds (overrides PANEL_POLL_INTERVAL_SECS)
    #[arg(long)]
    interval: Option<u64>,

    /// Log file path (overrides PANEL_LOG_FILE)
    #[arg(long)]
    log_file: Option<String>,

    /// Fetch one status snapshot, print it, and exit (no TUI)
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut cfg = Config::from_env()?;
    if let Some(server) = cli.server {
        cfg.server_url = server;
    }
    if let Some(interval) = cli.interval {
        cfg.poll_interval_secs = interval;
    }
    if let Some(log_file) = cli.log_file {
        cfg.log_file = log_file;
    }

    let api = Arc::new(ApiClient::new(&cfg.server_url, cfg.http_timeout_secs));

    if cli.once {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .init();
        return print_snapshot(&api).await;
    }

    // The terminal belongs to the TUI, so diagnostics go to a file.
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cfg.log_file)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .init();

    info!(server = %cfg.server_url, interval = cfg.poll_interval_secs, "panel starting");

    let state = Arc::new(Mutex::new(DashboardState::new(Duration::from_secs(
        cfg.notice_ttl_secs,
    ))));
    let refresh = Arc::new(Notify::new());
    let shutdown = CancellationToken::new();

    // One-shot dataset load; never retried, never re-polled.
    {
        let api = api.clone();
        let state = state.clone();
        tokio::spawn(async move { catalog::load(&api, &state).await });
    }

    // Recurring reconciliation: first tick fires immediately, then every
    // interval; `refresh` adds out-of-band ticks after successful commands.
    let poller = poller::spawn(
        api.clone(),
        state.clone(),
        refresh.clone(),
        shutdown.clone(),
        Duration::from_secs(cfg.poll_interval_secs),
    );

    let ctx = CommandContext {
        api,
        state: state.clone(),
        refresh,
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &state, &ctx);

    // Teardown: no more poll ticks (an in-flight request is left to settle
    // on its own), then hand the terminal back.
    shutdown.cancel();
    drop(poller);
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("panel stopped");
    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &Arc<Mutex<DashboardState>>,
    ctx: &CommandContext,
) -> Result<()> {
    loop {
        {
            let s = state.lock().unwrap();
            terminal.draw(|f| ui::draw(f, &s))?;
        }

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let modal_open = state.lock().unwrap().confirm_stop.is_some();
        if modal_open {
            match key.code {
                KeyCode::Char('y') | KeyCode::Enter => commands::confirm_stop(ctx),
                KeyCode::Char('n') | KeyCode::Esc => commands::decline_stop(ctx),
                _ => {}
            }
            continue;
        }

        match key.code {
            KeyCode::Esc => return Ok(()),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(());
            }
            KeyCode::Enter => commands::launch(ctx),
            KeyCode::Tab => state.lock().unwrap().select_next_dataset(),
            KeyCode::BackTab => state.lock().unwrap().select_prev_dataset(),
            KeyCode::Down => state.lock().unwrap().select_next_card(),
            KeyCode::Up => state.lock().unwrap().select_prev_card(),
            KeyCode::Delete => commands::request_stop(ctx),
            KeyCode::Backspace => {
                state.lock().unwrap().bot_id_input.pop();
            }
            KeyCode::Char(c) if is_text_key(&key) => {
                let mut s = state.lock().unwrap();
                if s.bot_id_input.len() < 40 {
                    s.bot_id_input.push(c);
                }
            }
            _ => {}
        }
    }
}

/// Plain typing only: Ctrl/Alt chords are shortcuts, not bot-id text.
fn is_text_key(key: &KeyEvent) -> bool {
    !key.modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

/// Headless mode: one snapshot to stdout, for scripting and quick checks.
async fn print_snapshot(api: &ApiClient) -> Result<()> {
    let snapshot = api
        .fetch_status()
        .await
        .map_err(|e| anyhow::anyhow!("status fetch failed: {e}"))?;
    let cards = build_cards(&snapshot);

    if cards.is_empty() {
        println!("No active bots.");
        return Ok(());
    }
    for card in cards {
        println!("{}  {}", card.bot_id, card.status_label);
        println!(
            "  portfolio {}  last {}  cash {}  pos {}",
            card.portfolio, card.last_price, card.cash, card.position
        );
        for log in &card.logs {
            println!("    {log}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn plain_and_shifted_chars_are_text() {
        assert!(is_text_key(&key(KeyCode::Char('a'), KeyModifiers::NONE)));
        assert!(is_text_key(&key(KeyCode::Char('A'), KeyModifiers::SHIFT)));
    }

    #[test]
    fn ctrl_and_alt_chords_are_not_text() {
        assert!(!is_text_key(&key(KeyCode::Char('r'), KeyModifiers::CONTROL)));
        assert!(!is_text_key(&key(KeyCode::Char('x'), KeyModifiers::ALT)));
        assert!(!is_text_key(&key(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT
        )));
    }
}
