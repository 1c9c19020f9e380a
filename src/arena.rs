//! Headless games between two agents.

use tracing::{debug, info};

use crate::ai::Agent;
use crate::error::SearchError;
use crate::game::{GameState, Move, Outcome, Player};

/// A finished game.
#[derive(Debug, Clone)]
pub struct GameRecord {
    pub final_state: GameState,
    pub outcome: Outcome,
    pub moves: Vec<Move>,
}

/// Play one game to completion. `red` plays Red, `yellow` plays Yellow.
pub fn play_game(
    red: &mut dyn Agent,
    yellow: &mut dyn Agent,
    starting: Player,
) -> Result<GameRecord, SearchError> {
    let mut state = GameState::new(starting);
    let mut moves = Vec::new();

    loop {
        let outcome = state.evaluate_outcome();
        if outcome.is_decided() {
            return Ok(GameRecord {
                final_state: state,
                outcome,
                moves,
            });
        }

        let mover = state.current_player();
        let mv = match mover {
            Player::Red => red.select_move(&state)?,
            Player::Yellow => yellow.select_move(&state)?,
        };
        debug!(player = mover.name(), %mv, "arena move");
        state.apply_move(mv)?;
        moves.push(mv);
    }
}

/// Win/loss/draw tally from the point of view of the first agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    pub total_moves: usize,
}

impl MatchStats {
    pub fn games(&self) -> usize {
        self.wins + self.losses + self.draws
    }

    pub fn win_rate(&self) -> f32 {
        let games = self.games();
        if games == 0 {
            return 0.0;
        }
        self.wins as f32 / games as f32
    }

    pub fn draw_rate(&self) -> f32 {
        let games = self.games();
        if games == 0 {
            return 0.0;
        }
        self.draws as f32 / games as f32
    }

    /// Average game length in moves.
    pub fn avg_length(&self) -> f32 {
        let games = self.games();
        if games == 0 {
            return 0.0;
        }
        self.total_moves as f32 / games as f32
    }

    pub fn record(&mut self, record: &GameRecord) {
        self.total_moves += record.moves.len();
        match record.outcome {
            Outcome::Winner(Player::Red) => self.wins += 1,
            Outcome::Winner(Player::Yellow) => self.losses += 1,
            Outcome::Draw | Outcome::InProgress => self.draws += 1,
        }
    }
}

/// Play `games` games with `agent` as Red against `opponent` as Yellow,
/// alternating which side moves first.
pub fn run_match(
    agent: &mut dyn Agent,
    opponent: &mut dyn Agent,
    games: usize,
) -> Result<MatchStats, SearchError> {
    let mut stats = MatchStats::default();

    for game_idx in 0..games {
        let starting = if game_idx % 2 == 0 {
            Player::Red
        } else {
            Player::Yellow
        };
        let record = play_game(agent, opponent, starting)?;
        stats.record(&record);
        info!(
            game = game_idx + 1,
            starting = starting.name(),
            outcome = ?record.outcome,
            moves = record.moves.len(),
            "game finished"
        );
    }

    Ok(stats)
}
