//! Monte-Carlo Tree Search with UCB1 selection and random rollouts.
//!
//! One search per computer turn:
//!
//! 1. **Selection**: follow untried moves first, then the highest UCB1 child
//! 2. **Rollout**: random legal moves until the game is decided
//! 3. **Back-propagation**: visits on every node up to the root, wins on the
//!    nodes whose move the searching side made
//!
//! The move finally played is the root child with the best win ratio
//! ([`FinalSelection::Max`]) or the most visits ([`FinalSelection::Robust`]),
//! unless an immediate win or a forced block is available.

mod config;
mod engine;
mod node;
mod tree;

pub use config::{FinalSelection, MctsConfig, DEFAULT_EXPLORATION};
pub use engine::{ChildStats, MctsEngine, SearchReport, StopReason};
pub use node::{ucb1, NodeId, SearchNode};
pub use tree::SearchTree;
