//! # Connect Four MCTS
//!
//! Connect Four on the standard 6×7 board against a computer opponent driven by
//! time-bounded Monte-Carlo Tree Search (UCT with random rollouts).
//!
//! ## Modules
//!
//! - [`game`]: board, player, move legality, win and draw detection
//! - [`ai`]: agent trait, random agent, MCTS engine and agent
//! - [`arena`]: headless agent-versus-agent games and match statistics
//! - [`ui`]: terminal UI for playing against the engine
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: structured error types

pub mod ai;
pub mod arena;
pub mod config;
pub mod error;
pub mod game;
pub mod ui;
