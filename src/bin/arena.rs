use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use connect_four_mcts::ai::mcts::MctsConfig;
use connect_four_mcts::ai::{Agent, MctsAgent, RandomAgent};
use connect_four_mcts::arena::{play_game, run_match};
use connect_four_mcts::config::AppConfig;
use connect_four_mcts::game::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Opponent {
    Random,
    Mcts,
}

/// Pit the MCTS engine against an opponent without a UI.
#[derive(Parser)]
#[command(name = "arena", about = "Headless MCTS matches")]
struct Cli {
    /// Opponent for the engine (which always plays Red)
    #[arg(long, value_enum, default_value = "random")]
    opponent: Opponent,

    /// Override number of games
    #[arg(long)]
    games: Option<usize>,

    /// Override per-move thinking time, in milliseconds
    #[arg(long)]
    time_ms: Option<u64>,

    /// Base RNG seed; each agent derives its own from it
    #[arg(long)]
    seed: Option<u64>,

    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Default log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Play a single game and print the final board
    #[arg(long)]
    show_game: bool,
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let mut app_config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(games) = cli.games {
        app_config.arena.games = games;
    }
    if let Some(ms) = cli.time_ms {
        app_config.arena.time_budget_ms = ms;
    }
    app_config.validate().context("validating configuration")?;

    let search = MctsConfig {
        time_budget_ms: app_config.arena.time_budget_ms,
        seed: cli.seed.or(app_config.search.seed),
        ..app_config.search.clone()
    };
    let opponent_seed = search.seed.map(|s| s.wrapping_add(1));

    let mut engine = MctsAgent::new(search.clone());
    let mut opponent: Box<dyn Agent> = match cli.opponent {
        Opponent::Random => match opponent_seed {
            Some(seed) => Box::new(RandomAgent::seeded(seed)),
            None => Box::new(RandomAgent::new()),
        },
        Opponent::Mcts => Box::new(MctsAgent::new(search.with_seed(opponent_seed))),
    };

    if cli.show_game {
        let record =
            play_game(&mut engine, &mut opponent, Player::Red).context("playing game")?;
        let columns: Vec<String> = record
            .moves
            .iter()
            .map(|mv| (mv.column() + 1).to_string())
            .collect();
        println!("{}", record.final_state.board());
        println!("Moves: {}", columns.join(" "));
        println!("Outcome: {:?}", record.outcome);
        return Ok(());
    }

    println!(
        "{} (Red) vs {} (Yellow): {} games, {} ms per move",
        engine.name(),
        opponent.name(),
        app_config.arena.games,
        app_config.arena.time_budget_ms
    );

    let stats = run_match(&mut engine, &mut opponent, app_config.arena.games)
        .context("running match")?;

    println!(
        "wins {}  losses {}  draws {}  |  win rate {:.1}%  draw rate {:.1}%  avg length {:.1}",
        stats.wins,
        stats.losses,
        stats.draws,
        stats.win_rate() * 100.0,
        stats.draw_rate() * 100.0,
        stats.avg_length()
    );

    Ok(())
}
