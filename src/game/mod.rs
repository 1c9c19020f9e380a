//! Core Connect Four game logic: board representation, player types, moves,
//! and the mutable game state with full-grid outcome evaluation.

mod board;
mod player;
mod state;

pub use board::{Board, Cell, COLS, ROWS, WIN_LENGTH};
pub use player::Player;
pub use state::{GameState, Move, MoveError, Outcome};
