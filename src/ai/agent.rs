use crate::error::SearchError;
use crate::game::{GameState, Move};

/// Anything that can pick a move for the side to play.
pub trait Agent {
    /// Select a move for `state.current_player()`.
    fn select_move(&mut self, state: &GameState) -> Result<Move, SearchError>;

    /// Return the agent's display name.
    fn name(&self) -> &str;
}

impl<A: Agent + ?Sized> Agent for Box<A> {
    fn select_move(&mut self, state: &GameState) -> Result<Move, SearchError> {
        (**self).select_move(state)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
