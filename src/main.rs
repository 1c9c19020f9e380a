use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use connect_four_mcts::ai::mcts::FinalSelection;
use connect_four_mcts::config::{AppConfig, Starter};
use connect_four_mcts::ui::App;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

/// Play Connect Four against a Monte-Carlo Tree Search opponent.
#[derive(Parser)]
#[command(name = "connect-four", about = "Play Connect Four against an MCTS engine")]
struct Cli {
    /// Who moves first
    #[arg(long, value_enum)]
    first: Option<Starter>,

    /// Computer thinking time per move, in milliseconds
    #[arg(long)]
    time_ms: Option<u64>,

    /// How the computer picks its move once the search stops
    #[arg(long, value_enum)]
    strategy: Option<FinalSelection>,

    /// UCB1 exploration constant
    #[arg(long)]
    exploration: Option<f64>,

    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Write logs to this file (the terminal is taken by the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Default log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn init_file_tracing(path: &Path, level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let file = File::create(path)
        .with_context(|| format!("creating log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(filter)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", AppConfig::default_toml()?);
        return Ok(());
    }

    if let Some(path) = &cli.log_file {
        init_file_tracing(path, &cli.log_level)?;
    }

    let mut app_config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(first) = cli.first {
        app_config.game.first = first;
    }
    if let Some(ms) = cli.time_ms {
        app_config.search.time_budget_ms = ms;
    }
    if let Some(strategy) = cli.strategy {
        app_config.search.final_selection = strategy;
    }
    if let Some(c) = cli.exploration {
        app_config.search.exploration_constant = c;
    }
    app_config.validate().context("validating configuration")?;

    info!(
        first = ?app_config.game.first,
        budget_ms = app_config.search.time_budget_ms,
        strategy = ?app_config.search.final_selection,
        "starting interactive game"
    );

    run_tui(App::new(app_config.search, app_config.game.first))
}

fn run_tui(mut app: App) -> Result<()> {
    // Setup terminal
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("creating terminal")?;

    let res = app.run(&mut terminal);

    // Restore terminal, even on error
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    res.context("running game UI")
}
