use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use ratatui::Terminal;
use ratatui::crossterm::event;
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::CrosstermBackend;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use pdfchat_core::{ApiClient, Config, ConfigOverrides, FileConfig, ReprocessPolicy};

mod action;
mod app;
mod backend;
mod input;
mod model;
mod theme;
mod tui_event;
mod view;

use app::App;

/// pdfchat TUI: upload PDFs to a question-answering server and chat about them.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// PDF files or directories to preselect for upload
    paths: Vec<PathBuf>,

    /// Base URL of the PDF chat server
    #[arg(long)]
    api_url: Option<String>,

    /// Request timeout in seconds (0 disables the timeout)
    #[arg(long)]
    timeout: Option<u64>,

    /// Number of passages the server retrieves per question
    #[arg(long)]
    n_results: Option<u32>,

    /// When to rebuild the server's search index: on-startup, after-upload, never
    #[arg(long)]
    reprocess: Option<ReprocessPolicy>,

    /// Config file (default: <config dir>/pdfchat/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write log output to this file (the terminal is owned by the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(path: Option<&PathBuf>) -> anyhow::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = std::fs::File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_logging(args.log_file.as_ref())?;

    // Resolve config from CLI flags > env vars > config file > defaults
    let file = FileConfig::load_or_default(args.config.as_deref())?;
    let config = Config::resolve(
        ConfigOverrides {
            base_url: args.api_url,
            timeout_secs: args.timeout,
            n_results: args.n_results,
            reprocess: args.reprocess,
        },
        file,
    )?;
    log::info!(
        "server {} (n_results={}, reprocess={})",
        config.base_url,
        config.n_results,
        config.reprocess
    );

    let api = Arc::new(ApiClient::from_config(&config)?);

    // Validate paths before taking over the terminal
    let preselected = if args.paths.is_empty() {
        Vec::new()
    } else {
        model::selection::expand_paths(&args.paths)?
    };

    let mut app = App::new(&config, api.base_url().to_string());
    if !preselected.is_empty() {
        app.select_files(preselected);
    }

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Install panic hook that restores terminal before printing panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Drain any stray input events (e.g. Enter keypress from launching the command)
    while event::poll(Duration::from_millis(50)).unwrap_or(false) {
        let _ = event::read();
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();

    for request in app.startup_requests() {
        backend::spawn_request(request, api.clone(), tx.clone(), cancel.clone());
    }

    // Also handle Ctrl+C at the OS level for clean shutdown
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_for_signal.cancel();
        }
    });

    let tick_rate = Duration::from_millis(100);

    loop {
        terminal.draw(|f| app.view(f))?;

        let mut follow_ups = Vec::new();
        tokio::select! {
            maybe_event = rx.recv() => {
                if let Some(backend_event) = maybe_event {
                    follow_ups.extend(app.handle_backend_event(backend_event));
                    // Drain any additional queued backend events
                    while let Ok(evt) = rx.try_recv() {
                        follow_ups.extend(app.handle_backend_event(evt));
                    }
                }
            }
            _ = cancel.cancelled() => {
                app.should_quit = true;
            }
            request = async {
                if event::poll(tick_rate).unwrap_or(false) {
                    if let Ok(evt) = event::read() {
                        let action = input::map_event(&evt, app.input_mode());
                        return app.update(action);
                    }
                }
                None
            } => {
                follow_ups.extend(request);
            }
        }

        for request in follow_ups {
            log::debug!("dispatching {request:?}");
            backend::spawn_request(request, api.clone(), tx.clone(), cancel.clone());
        }

        app.update(action::Action::Tick);

        if app.should_quit {
            cancel.cancel();
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}
