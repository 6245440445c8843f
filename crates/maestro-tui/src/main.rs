use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use maestro_core::settings::Settings;
use ratatui::prelude::{CrosstermBackend, Terminal};
use std::fs::OpenOptions;
use std::io::{stdout, Stdout};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
mod ui;
use ui::app::App;

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();
    let settings = match Settings::new() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Warning: Failed to load settings: {}. Using defaults.", e);
            Settings::default()
        }
    };

    if let Err(e) = init_logging(&settings) {
        eprintln!(
            "Warning: Could not open log file {}: {}",
            settings.log_file.display(),
            e
        );
    }
    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), ".env loaded"),
        Err(e) => tracing::debug!(error = %e, ".env not loaded, using process environment"),
    }
    if !settings.has_api_key() {
        tracing::warn!("no API key configured; set OPENAI_API_KEY");
    }

    let dispatcher = maestro_core::dispatcher(&settings);
    let mut terminal = init_terminal()?;
    let mut app = App::new(settings, dispatcher);

    let result = app.run(&mut terminal).await;

    restore_terminal(&mut terminal)?;

    result
}

/// Logs go to a file; stdout belongs to the terminal UI.
fn init_logging(settings: &Settings) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&settings.log_file)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn init_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
