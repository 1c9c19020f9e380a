use rand::rngs::StdRng;

use super::agent::Agent;
use super::mcts::{MctsConfig, MctsEngine, SearchReport};
use crate::error::SearchError;
use crate::game::{GameState, Move};

/// Agent backed by a time-bounded MCTS search.
pub struct MctsAgent {
    engine: MctsEngine<StdRng>,
    last_report: Option<SearchReport>,
}

impl MctsAgent {
    pub fn new(config: MctsConfig) -> Self {
        MctsAgent {
            engine: MctsEngine::new(config),
            last_report: None,
        }
    }

    pub fn config(&self) -> &MctsConfig {
        self.engine.config()
    }

    /// Statistics of the most recent search.
    pub fn last_report(&self) -> Option<&SearchReport> {
        self.last_report.as_ref()
    }
}

impl Agent for MctsAgent {
    fn select_move(&mut self, state: &GameState) -> Result<Move, SearchError> {
        let report = self.engine.search(state)?;
        let mv = report.chosen;
        self.last_report = Some(report);
        Ok(mv)
    }

    fn name(&self) -> &str {
        "MCTS"
    }
}
