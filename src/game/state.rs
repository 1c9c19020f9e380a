use std::fmt;

use super::board::{Board, Cell, COLS};
use super::player::Player;

/// A move: the 0-based column a piece is dropped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Move(usize);

impl Move {
    pub fn new(column: usize) -> Self {
        Move(column)
    }

    pub fn column(self) -> usize {
        self.0
    }
}

impl fmt::Display for Move {
    /// Columns are shown 1-based, as players number them.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "column {}", self.0 + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    InProgress,
    Draw,
    Winner(Player),
}

impl Outcome {
    pub fn is_decided(self) -> bool {
        self != Outcome::InProgress
    }

    pub fn winner(self) -> Option<Player> {
        match self {
            Outcome::Winner(player) => Some(player),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("column {} is full", .0 + 1)]
    ColumnFull(usize),

    #[error("column {} does not exist", .0 + 1)]
    InvalidColumn(usize),
}

/// Board plus the side to move. `Clone` is a deep copy: the grid is an inline
/// array, so two states never share cell storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameState {
    board: Board,
    current_player: Player,
}

impl GameState {
    /// Empty board with `starting` to move.
    pub fn new(starting: Player) -> Self {
        GameState {
            board: Board::new(),
            current_player: starting,
        }
    }

    /// Arbitrary position, e.g. a parsed fixture.
    pub fn from_board(board: Board, current_player: Player) -> Self {
        GameState {
            board,
            current_player,
        }
    }

    /// Get current player
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Get reference to board
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.board.get(row, col)
    }

    /// One move per column whose top cell is empty, ascending. Does not look
    /// at whether the game is already decided.
    pub fn legal_moves(&self) -> Vec<Move> {
        (0..COLS)
            .filter(|&col| !self.board.is_column_full(col))
            .map(Move)
            .collect()
    }

    pub fn is_legal(&self, mv: Move) -> bool {
        !self.board.is_column_full(mv.column())
    }

    /// Drop the current player's piece into `mv`'s column and pass the turn.
    /// Leaves the state untouched on error.
    pub fn apply_move(&mut self, mv: Move) -> Result<(), MoveError> {
        self.board
            .drop_piece(mv.column(), self.current_player.to_cell())?;
        self.current_player = self.current_player.other();
        Ok(())
    }

    /// Clone, then apply `mv` to the clone.
    pub fn with_move(&self, mv: Move) -> Result<GameState, MoveError> {
        let mut next = self.clone();
        next.apply_move(mv)?;
        Ok(next)
    }

    /// Full-grid scan for a winner, then for a full board.
    pub fn evaluate_outcome(&self) -> Outcome {
        if let Some(player) = self.board.find_winner() {
            Outcome::Winner(player)
        } else if self.board.is_full() {
            Outcome::Draw
        } else {
            Outcome::InProgress
        }
    }

    /// Moves that win on the spot for the side to move.
    pub fn winning_moves(&self) -> Vec<Move> {
        let player = self.current_player;
        self.legal_moves()
            .into_iter()
            .filter(|&mv| {
                self.with_move(mv)
                    .is_ok_and(|next| next.evaluate_outcome() == Outcome::Winner(player))
            })
            .collect()
    }
}
