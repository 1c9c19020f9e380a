//! Search tree vertices and the UCB1 score.

use crate::game::{GameState, Move, Player};

/// Index into the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub(super) fn from_index(index: usize) -> Self {
        NodeId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One vertex of the search tree.
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// Position reached after `mv` was played from the parent's position.
    pub(super) state: GameState,
    /// `None` for the root.
    pub(super) mv: Option<Move>,
    /// Side that played `mv`. For the root, the side that is *not* searching.
    pub(super) side_played: Player,
    pub(super) parent: Option<NodeId>,
    /// At most one child per move, in creation order.
    pub(super) children: Vec<NodeId>,
    pub(super) visits: u32,
    pub(super) wins: u32,
    /// Decided position, or a subtree with nothing left to explore.
    pub(super) terminal: bool,
    /// UCB1 score as of the last back-propagation through this node.
    pub(super) score: f64,
}

impl SearchNode {
    pub(super) fn root(state: GameState) -> Self {
        let side_played = state.current_player().other();
        SearchNode {
            state,
            mv: None,
            side_played,
            parent: None,
            children: Vec::new(),
            visits: 0,
            wins: 0,
            terminal: false,
            score: f64::INFINITY,
        }
    }

    pub(super) fn child(parent: NodeId, state: GameState, mv: Move, side_played: Player) -> Self {
        SearchNode {
            state,
            mv: Some(mv),
            side_played,
            parent: Some(parent),
            children: Vec::new(),
            visits: 0,
            wins: 0,
            terminal: false,
            score: f64::INFINITY,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn mv(&self) -> Option<Move> {
        self.mv
    }

    pub fn side_played(&self) -> Player {
        self.side_played
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn visits(&self) -> u32 {
        self.visits
    }

    pub fn wins(&self) -> u32 {
        self.wins
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn cached_score(&self) -> f64 {
        self.score
    }

    /// `wins / visits`, or `+inf` for a node that was never evaluated. Callers
    /// comparing ratios must treat the infinite sentinel as "no data".
    pub fn win_ratio(&self) -> f64 {
        if self.visits == 0 {
            f64::INFINITY
        } else {
            self.wins as f64 / self.visits as f64
        }
    }
}

/// UCB1 seen from the searching side:
/// `±(wins/visits + c * sqrt(ln(parent_visits) / visits))`, positive when the
/// node's move was made by the searching side. Unvisited nodes score `+inf`.
pub fn ucb1(wins: u32, visits: u32, parent_visits: u32, c: f64, searching_side_moved: bool) -> f64 {
    if visits == 0 {
        return f64::INFINITY;
    }
    let visits = visits as f64;
    let exploit = wins as f64 / visits;
    let explore = c * ((parent_visits.max(1) as f64).ln() / visits).sqrt();
    let score = exploit + explore;
    if searching_side_moved {
        score
    } else {
        -score
    }
}
