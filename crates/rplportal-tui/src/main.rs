//! RPL Portal TUI - terminal dashboards for Recognition of Prior Learning
//! portfolios.
//!
//! Portfolio staff invite and track students, RTO assessors review endorsed
//! students, and admins assign assessors and students to RTOs.

mod app;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rplportal_core::api::{ApiClient, Gateway};
use rplportal_core::auth::{CredentialStore, Session};
use rplportal_core::config::{Config, APP_NAME};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file written inside the cache directory
const LOG_FILE: &str = "rplportal.log";

#[derive(Debug, Parser)]
#[command(name = APP_NAME, version, about = "Terminal dashboards for RPL portfolios")]
struct Cli {
    /// Backend base URL (overrides RPLPORTAL_URL)
    #[arg(long)]
    url: Option<String>,

    /// Backend anon key (overrides RPLPORTAL_ANON_KEY)
    #[arg(long)]
    anon_key: Option<String>,

    /// Sign out, forget the saved session and exit
    #[arg(long)]
    sign_out: bool,
}

/// Initialize the tracing subscriber, writing to a log file so output does
/// not land on the terminal UI. Use RUST_LOG to control the level.
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_dir = config.cache_dir().ok()?;
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Logging disabled: {}", e);
        return None;
    }

    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        Config::default()
    });
    config.apply_env();
    if let Some(url) = cli.url {
        config.url = Some(url);
    }
    if let Some(anon_key) = cli.anon_key {
        config.anon_key = Some(anon_key);
    }

    let _log_guard = init_tracing(&config);
    info!("RPL Portal TUI starting");

    let backend = config.backend()?;
    let api = ApiClient::new(&backend.url, &backend.anon_key)
        .context("Failed to create HTTP client")?;

    if cli.sign_out {
        return sign_out(&config, api).await;
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, api);

    if app.is_authenticated() {
        app.resume_session().await;
    } else {
        app.start_login();
    }

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("RPL Portal TUI shutting down");
    Ok(())
}

/// `--sign-out`: revoke the saved session and forget stored credentials.
async fn sign_out(config: &Config, api: ApiClient) -> Result<()> {
    let mut session = Session::new(config.cache_dir()?);
    if session.load()? {
        if let Some(token) = session.token() {
            if let Err(e) = api.with_token(token.to_string()).sign_out().await {
                warn!(error = %e, "Sign-out request failed");
            }
        }
    }
    session.clear()?;

    if let Some(ref email) = config.last_email {
        if let Err(e) = CredentialStore::delete(email) {
            warn!(error = %e, "Failed to delete stored credentials");
        }
    }

    println!("Signed out.");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| render(f, app))?;

        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C quits immediately
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
                {
                    return Ok(());
                }

                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        app.check_background_tasks().await;

        if app.state == AppState::Quitting {
            return Ok(());
        }
    }
}
