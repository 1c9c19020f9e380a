use std::path::PathBuf;

use crate::game::{MoveError, COLS, ROWS};

/// Errors raised when parsing a textual board fixture.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardParseError {
    #[error("expected {rows} rows, found {0}", rows = ROWS)]
    RowCount(usize),

    #[error("row {row} has {len} cells, expected {cols}", cols = COLS)]
    RowLength { row: usize, len: usize },

    #[error("unknown symbol {symbol:?} at row {row}, column {col}")]
    Symbol { row: usize, col: usize, symbol: char },
}

/// Errors that can occur when asking the search engine for a move.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("no legal moves available")]
    NoLegalMoves,

    #[error("game is already over")]
    GameOver,

    #[error("search tried an illegal move: {0}")]
    IllegalMove(#[from] MoveError),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_parse_error_display() {
        let err = BoardParseError::Symbol {
            row: 2,
            col: 4,
            symbol: '?',
        };
        assert_eq!(err.to_string(), "unknown symbol '?' at row 2, column 4");
        assert_eq!(
            BoardParseError::RowCount(2).to_string(),
            format!("expected {ROWS} rows, found 2")
        );
        assert_eq!(
            BoardParseError::RowLength { row: 5, len: 6 }.to_string(),
            format!("row 5 has 6 cells, expected {COLS}")
        );
    }

    #[test]
    fn test_search_error_display() {
        assert_eq!(
            SearchError::NoLegalMoves.to_string(),
            "no legal moves available"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("search.exploration_constant must be >= 0".to_string());
        assert_eq!(
            err.to_string(),
            "config validation error: search.exploration_constant must be >= 0"
        );
    }
}
