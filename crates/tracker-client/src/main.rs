// crates/tracker-client/src/main.rs

mod app;
mod clipboard;
mod components;
mod config;
mod network;
mod ui;

use std::path::PathBuf;
use std::sync::Mutex;
use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::clipboard::ClipboardPoller;
use crate::config::ClientConfig;
use crate::network::NetworkEvent;

#[derive(Parser)]
#[clap(name = "tracker-client")]
#[clap(about = "Shared live map overlay: copy your coordinates, see everyone's trail")]
struct Cli {
    /// Path to the TOML config file
    #[clap(short, long, default_value = "tracker-client.toml")]
    config: PathBuf,

    /// Relay address, overrides the config file
    #[clap(short, long)]
    server: Option<String>,

    /// Shared password, overrides the config file
    #[clap(short, long)]
    password: Option<String>,

    /// Connect on startup
    #[clap(long)]
    auto_connect: bool,

    /// Write debug logs to tracker-client.log
    #[clap(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; stdout belongs to the terminal UI.
    if cli.debug {
        let log_file = std::fs::File::create("tracker-client.log")
            .context("failed to create tracker-client.log")?;
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
            .with_writer(Mutex::new(log_file))
            .with_ansi(false)
            .init();
    }

    let mut config = ClientConfig::load(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    if let Some(server) = cli.server {
        config.server_addr = server;
    }
    if let Some(password) = cli.password {
        config.password = password;
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, config, cli.auto_connect).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, config: ClientConfig, auto_connect: bool) -> Result<()> {
    // Network task → render loop hand-off
    let (tx_to_app, mut rx_from_network) = mpsc::unbounded_channel::<NetworkEvent>();

    let mut clipboard = ClipboardPoller::new(config.poll_interval());
    let mut app = App::new(config, tx_to_app);

    if !clipboard.is_available() {
        app.status_message = "Clipboard unavailable: positions will not be sent".to_string();
        warn!("Running without clipboard access");
    }

    if auto_connect {
        app.connect();
    }

    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        // Handle keys with a short timeout so the loop keeps ticking
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => app.quit(),
                        KeyCode::Char('c') | KeyCode::Char('C') => app.connect(),
                        KeyCode::Char('d') | KeyCode::Char('D') => app.disconnect(),
                        KeyCode::Char('r') | KeyCode::Char('R') => app.reset_map(),
                        _ => {}
                    }
                }
            }
        }

        if let Some(text) = clipboard.poll() {
            app.on_clipboard_text(&text);
        }
        app.tick(Instant::now());

        // Drain network events without blocking
        while let Ok(ev) = rx_from_network.try_recv() {
            app.handle_network_event(ev);
        }

        if app.should_quit {
            break;
        }
    }

    info!("Exiting");
    Ok(())
}
