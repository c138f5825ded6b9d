//! Strompris dashboard: hourly spot prices per zone in the terminal.
//!
//! Panels:
//! 1. Prices: price chart for one zone over a date range, failed days inline
//! 2. Compare: daily mean price per zone from the historical dataset
//! 3. Help: key bindings

mod app;
mod input;
mod persistence;
mod theme;
mod ui;
mod worker;

use std::fs::{self, File};
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use strompris_core::data::{HvaKosterStrommen, PriceSource, RangeAggregator};
use strompris_core::StromprisConfig;

use crate::app::{AppState, Panel};
use crate::worker::WorkerCommand;

fn main() -> Result<()> {
    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    // Paths
    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("strompris");
    let state_path = config_dir.join("state.json");
    let config_path = config_dir.join("config.toml");
    let log_path = dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("strompris")
        .join("dashboard.log");

    init_logging(&log_path);

    let config = if config_path.exists() {
        StromprisConfig::from_file(&config_path)
            .with_context(|| format!("loading {}", config_path.display()))?
    } else {
        StromprisConfig::default()
    };
    info!(base_url = %config.source.base_url, "dashboard starting");

    // Worker owns the aggregator and its range cache.
    let source: Box<dyn PriceSource> =
        Box::new(HvaKosterStrommen::new(&config.source).context("building HTTP client")?);
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let worker_handle = worker::spawn_worker(RangeAggregator::new(source), cmd_rx, resp_tx)
        .context("spawning worker thread")?;

    let today = chrono::Local::now().date_naive();
    let mut app = AppState::new(cmd_tx.clone(), resp_rx, &config, today);
    if let Some(persisted) = persistence::load(&state_path) {
        persistence::apply(&mut app, persisted);
    }
    app.request_range();
    if app.active_panel == Panel::Compare {
        app.request_history();
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    // Save state before exit
    if let Err(e) = persistence::save(&state_path, &persistence::extract(&app)) {
        warn!(error = %e, "could not save dashboard state");
    }

    // Shutdown worker
    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Log to a file; the terminal belongs to the UI. Without a writable log
/// file the dashboard runs unlogged.
fn init_logging(path: &Path) {
    let file = path
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|()| File::options().create(true).append(true).open(path));

    if let Ok(file) = file {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("strompris=debug")),
            )
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        // 1. Render
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Drain worker responses (non-blocking)
        while let Ok(resp) = app.worker_rx.try_recv() {
            app.apply_response(resp);
        }

        // 3. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        // 4. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}
