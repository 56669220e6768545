//! Passgate TUI - passcode and biometric app lock for the terminal
//!
//! Locks on start and whenever the terminal regains focus, and unlocks with
//! the passcode or an external biometric verifier.

use std::fs::{self, OpenOptions};
use std::io;
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableFocusChange, EnableFocusChange},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use passgate_tui::app::BiometricConfig;
use passgate_tui::{App, TuiConfig};

/// Log file name inside the data directory
const LOG_FILE_NAME: &str = "passgate.log";

/// Passcode and biometric lock for the terminal
#[derive(Parser, Debug)]
#[command(name = "passgate-tui", version, about)]
struct Args {
    /// Configuration file (defaults to ~/.config/passgate/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for credentials, settings and logs
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Disable biometric unlock
    #[arg(long)]
    no_biometrics: bool,

    /// Program run for biometric verification; exit status 0 unlocks
    #[arg(long, conflicts_with = "no_biometrics")]
    biometric_command: Option<String>,
}

/// Application entry point with panic handling for terminal restoration
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args);

    // Set up panic hook to restore terminal on crash
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableFocusChange);
        original_hook(panic_info);
    }));

    let data_dir = config.resolve_data_dir()?;
    init_logging(&data_dir)?;
    tracing::info!("Starting passgate-tui {}", env!("CARGO_PKG_VERSION"));

    let result = run_app(&config).await;

    if let Err(e) = &result {
        tracing::error!("Application error: {:#}", e);
    }

    result
}

/// Load the configuration file and apply command-line overrides
fn load_config(args: &Args) -> TuiConfig {
    let mut config = match &args.config {
        Some(path) => TuiConfig::load_from(path),
        None => TuiConfig::load(),
    };

    if let Some(dir) = &args.data_dir {
        config.data_dir = Some(dir.clone());
    }
    if args.no_biometrics {
        config.biometric = BiometricConfig::Disabled;
    } else if let Some(program) = &args.biometric_command {
        config.biometric = BiometricConfig::Command {
            program: program.clone(),
            args: Vec::new(),
        };
    }

    config
}

/// Log to a file in the data directory; the terminal belongs to the UI
fn init_logging(data_dir: &Path) -> Result<()> {
    fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;
    let log_path = data_dir.join(LOG_FILE_NAME);
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("passgate_tui=info,passgate_core=info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(Mutex::new(log_file))
                .with_ansi(false)
                .with_target(true),
        )
        .with(filter)
        .init();

    Ok(())
}

/// Main application runner
async fn run_app(config: &TuiConfig) -> Result<()> {
    let mut app = App::new(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;

    result
}
