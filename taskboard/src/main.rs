//! `Taskboard`: terminal task board backed by a remote todo collection.
//!
//! Launches the TUI on the login screen. After login the board loads the
//! collection from the configured todo service, or from an in-process demo
//! collection in offline mode. Configuration via CLI flags, environment
//! variables, or config file (`~/.config/taskboard/config.toml`).
//!
//! ```bash
//! # Against the public demo service
//! cargo run --bin taskboard
//!
//! # Against a local taskboard-server
//! cargo run --bin taskboard -- --base-url http://127.0.0.1:9000
//!
//! # Offline demo mode
//! cargo run --bin taskboard -- --offline
//! ```

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::{mpsc, watch};
use tracing_appender::non_blocking::WorkerGuard;

use taskboard::app::{App, Level};
use taskboard::config::{CliArgs, ClientConfig};
use taskboard::remote::AnyRemote;
use taskboard::remote::http::HttpRemote;
use taskboard::remote::memory::InMemoryRemote;
use taskboard::store::{StoreSnapshot, TaskStore};
use taskboard::ui;
use taskboard::worker::{self, BoardCommand, BoardEvent};

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    };

    // Logs go to a file; ratatui owns the terminal.
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    let remote = if config.offline {
        AnyRemote::Memory(InMemoryRemote::with_demo_tasks())
    } else {
        match HttpRemote::new(&config.base_url) {
            Ok(r) => AnyRemote::Http(r),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(2);
            }
        }
    };
    tracing::info!(remote = remote.label(), base_url = %config.base_url, "taskboard starting");

    let remote_label = remote.label();
    let store = Arc::new(TaskStore::with_options(remote, config.to_store_options()));
    let snapshots = store.subscribe();
    let (cmd_tx, evt_rx) = worker::spawn_worker(Arc::clone(&store), worker::DEFAULT_CHANNEL_CAPACITY);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(
        &mut terminal,
        &config,
        remote_label,
        &store,
        snapshots,
        &cmd_tx,
        evt_rx,
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("taskboard exiting");
    result
}

/// Initialize file-based logging.
///
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("taskboard.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Main application loop.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &ClientConfig,
    remote_label: &str,
    store: &TaskStore<AnyRemote>,
    snapshots: watch::Receiver<StoreSnapshot>,
    cmd_tx: &mpsc::Sender<BoardCommand>,
    mut evt_rx: mpsc::Receiver<BoardEvent>,
) -> io::Result<()> {
    let mut app = App::new(config);

    loop {
        let snapshot = snapshots.borrow().clone();

        // Step 1: Draw the UI frame.
        terminal.draw(|frame| ui::draw(frame, &app, &snapshot, remote_label))?;

        // Step 2: Drain worker events (non-blocking).
        let now = Instant::now();
        while let Ok(event) = evt_rx.try_recv() {
            app.apply_event(event, now);
        }
        app.expire_notifications(now);

        // Step 3: Poll for terminal input events.
        if event::poll(config.poll_timeout)?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            if let Some(cmd) = app.handle_key_event(key, &snapshot) {
                match worker::submit(store, cmd_tx, cmd) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        app.notify("Busy, try again", Level::Error, Instant::now());
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        app.notify("Worker stopped", Level::Error, Instant::now());
                    }
                }
            }
        }

        if app.should_quit {
            let _ = cmd_tx.try_send(BoardCommand::Shutdown);
            return Ok(());
        }
    }
}
