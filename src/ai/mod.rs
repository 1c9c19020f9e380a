mod agent;
pub mod mcts;
mod mcts_agent;
mod random;

pub use agent::Agent;
pub use mcts_agent::MctsAgent;
pub use random::RandomAgent;
