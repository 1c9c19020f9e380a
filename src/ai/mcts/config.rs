//! Search configuration.

use std::time::Duration;

/// Default UCB1 exploration constant, `sqrt(2)`.
pub const DEFAULT_EXPLORATION: f64 = std::f64::consts::SQRT_2;

/// How the move is picked from the root's children once the search stops.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum FinalSelection {
    /// Highest win ratio among evaluated children.
    #[default]
    Max,
    /// Highest visit count.
    Robust,
}

/// Configuration for the time-bounded UCT search.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    /// Wall-clock budget per move. Checked once per completed iteration, so a
    /// search can overrun it by one iteration.
    pub time_budget_ms: u64,

    /// Exploration constant `C` of the UCB1 formula.
    pub exploration_constant: f64,

    /// Final move-selection policy.
    pub final_selection: FinalSelection,

    /// Block the opponent's immediate win when the engine has no win of its own.
    pub block_immediate_threats: bool,

    /// Stop after this many iterations even if time remains.
    pub iteration_limit: Option<u64>,

    /// Arena size above which rollouts stop materializing nodes and are
    /// played out on a scratch state instead.
    pub max_nodes: usize,

    /// Seed for the rollout RNG. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        MctsConfig {
            time_budget_ms: 5_000,
            exploration_constant: DEFAULT_EXPLORATION,
            final_selection: FinalSelection::Max,
            block_immediate_threats: false,
            iteration_limit: None,
            max_nodes: 2_000_000,
            seed: None,
        }
    }
}

impl MctsConfig {
    /// Small, deterministic config for tests.
    pub fn for_testing() -> Self {
        MctsConfig {
            time_budget_ms: 60_000,
            iteration_limit: Some(500),
            seed: Some(42),
            ..Default::default()
        }
    }

    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }

    pub fn with_time_budget_ms(mut self, ms: u64) -> Self {
        self.time_budget_ms = ms;
        self
    }

    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    pub fn with_final_selection(mut self, selection: FinalSelection) -> Self {
        self.final_selection = selection;
        self
    }

    pub fn with_iteration_limit(mut self, limit: Option<u64>) -> Self {
        self.iteration_limit = limit;
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_threat_blocking(mut self, enabled: bool) -> Self {
        self.block_immediate_threats = enabled;
        self
    }
}
