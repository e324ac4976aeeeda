use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing_subscriber::EnvFilter;

use tabpilot::app::{config::Config, r#loop::run_loop, state::AppState};
use tabpilot::infrastructure::session_host::{default_session_path, SessionHost};

fn setup_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));
}

/// The TUI owns stdout, so logs go to a file under the data directory.
/// `TABPILOT_LOG` controls the filter (e.g. `TABPILOT_LOG=debug`).
fn setup_tracing() -> Result<()> {
    let Some(path) = default_session_path() else {
        return Ok(());
    };
    let dir = path
        .parent()
        .context("session path has no parent directory")?;
    std::fs::create_dir_all(dir)?;
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("tabpilot.log"))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("TABPILOT_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_panic_hook();
    setup_tracing()?;

    // Open the session BEFORE terminal setup so a failure (e.g. unwritable
    // data directory) doesn't leave the terminal in raw mode.
    let session_path =
        default_session_path().context("could not determine a home directory")?;
    let host = std::sync::Arc::new(SessionHost::open(session_path)?);
    let config = Config::load();
    let app_state = AppState::new(config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let res = run_loop(&mut terminal, app_state, host).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}
