use std::fmt;
use std::str::FromStr;

use super::player::Player;
use super::state::MoveError;
use crate::error::BoardParseError;

pub const ROWS: usize = 6;
pub const COLS: usize = 7;
/// Number of aligned pieces needed to win.
pub const WIN_LENGTH: usize = 4;

/// Scan directions as (row step, column step): horizontal, vertical, and the
/// two diagonals. Row 0 is the top of the board.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (-1, 1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Red,
    Yellow,
}

impl Cell {
    /// The player owning this cell, if any.
    pub fn player(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Red => Some(Player::Red),
            Cell::Yellow => Some(Player::Yellow),
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Cell::Empty => ' ',
            Cell::Red => 'X',
            Cell::Yellow => 'O',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [[Cell; COLS]; ROWS],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Board {
            cells: [[Cell::Empty; COLS]; ROWS],
        }
    }

    /// Get the cell at a specific position
    /// Row 0 is the top, row 5 is the bottom
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    /// Check if a column is full. Out-of-range columns count as full.
    pub fn is_column_full(&self, col: usize) -> bool {
        if col >= COLS {
            return true;
        }
        self.cells[0][col] != Cell::Empty
    }

    /// Drop a piece in a column, returns the row where it landed
    pub fn drop_piece(&mut self, col: usize, cell: Cell) -> Result<usize, MoveError> {
        if col >= COLS {
            return Err(MoveError::InvalidColumn(col));
        }

        if self.is_column_full(col) {
            return Err(MoveError::ColumnFull(col));
        }

        // Lowest empty row; the piece settles there regardless of what a
        // hand-built fixture left above it.
        let row = (0..ROWS)
            .rev()
            .find(|&row| self.cells[row][col] == Cell::Empty)
            .ok_or(MoveError::ColumnFull(col))?;
        self.cells[row][col] = cell;
        Ok(row)
    }

    /// Check if the board is completely full
    pub fn is_full(&self) -> bool {
        (0..COLS).all(|col| self.is_column_full(col))
    }

    /// Number of occupied cells.
    pub fn piece_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|&&cell| cell != Cell::Empty)
            .count()
    }

    /// Scan the whole grid, row-major, for a run of `WIN_LENGTH` equal pieces
    /// starting at some occupied cell. Returns the owner of the first run found.
    pub fn find_winner(&self) -> Option<Player> {
        for row in 0..ROWS {
            for col in 0..COLS {
                let cell = self.cells[row][col];
                let Some(player) = cell.player() else {
                    continue;
                };
                if DIRECTIONS
                    .iter()
                    .any(|&(dr, dc)| self.run_from(row, col, dr, dc, cell))
                {
                    return Some(player);
                }
            }
        }
        None
    }

    /// True if `WIN_LENGTH` cells starting at (row, col) along (dr, dc) all hold `cell`.
    fn run_from(&self, row: usize, col: usize, dr: isize, dc: isize, cell: Cell) -> bool {
        (1..WIN_LENGTH as isize).all(|k| {
            let r = row as isize + dr * k;
            let c = col as isize + dc * k;
            r >= 0
                && c >= 0
                && (r as usize) < ROWS
                && (c as usize) < COLS
                && self.cells[r as usize][c as usize] == cell
        })
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses a fixture: `ROWS` lines of `COLS` symbols, top row first.
/// `.` or `-` is empty, `X`/`R` is Red, `O`/`Y` is Yellow. Whitespace inside a
/// line is ignored, blank lines are skipped. Gravity is not checked.
impl FromStr for Board {
    type Err = BoardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<Vec<char>> = s
            .lines()
            .map(|line| line.chars().filter(|c| !c.is_whitespace()).collect::<Vec<_>>())
            .filter(|row| !row.is_empty())
            .collect();

        if rows.len() != ROWS {
            return Err(BoardParseError::RowCount(rows.len()));
        }

        let mut board = Board::new();
        for (row, symbols) in rows.iter().enumerate() {
            if symbols.len() != COLS {
                return Err(BoardParseError::RowLength {
                    row,
                    len: symbols.len(),
                });
            }
            for (col, &symbol) in symbols.iter().enumerate() {
                board.cells[row][col] = match symbol.to_ascii_uppercase() {
                    '.' | '-' => Cell::Empty,
                    'X' | 'R' => Cell::Red,
                    'O' | 'Y' => Cell::Yellow,
                    _ => return Err(BoardParseError::Symbol { row, col, symbol }),
                };
            }
        }
        Ok(board)
    }
}

/// Box-drawing grid with 1-based column headers and row labels.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ┃")?;
        for col in 1..=COLS {
            write!(f, " {col} ┃")?;
        }
        writeln!(f)?;
        writeln!(f, "━━━╋{}━━━┫", "━━━╇".repeat(COLS - 1))?;

        for row in 0..ROWS {
            write!(f, " {} ┃", row + 1)?;
            for col in 0..COLS {
                let sep = if col == COLS - 1 { '┃' } else { '│' };
                write!(f, " {} {sep}", self.cells[row][col].symbol())?;
            }
            writeln!(f)?;
            if row == ROWS - 1 {
                writeln!(f, "━━━┻{}━━━┛", "━━━┷".repeat(COLS - 1))?;
            } else {
                writeln!(f, "━━━╉{}───┨", "───┼".repeat(COLS - 1))?;
            }
        }
        Ok(())
    }
}
