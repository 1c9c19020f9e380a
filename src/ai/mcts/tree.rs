//! Arena-backed search tree.
//!
//! Nodes live in one `Vec`; parent and child links are [`NodeId`] indices, so
//! the parent/child cycle needs no shared ownership. The whole arena is
//! dropped with the tree at the end of a search.

use rand::Rng;

use super::node::{ucb1, NodeId, SearchNode};
use crate::game::{GameState, Move, MoveError, Outcome, Player};

pub struct SearchTree {
    nodes: Vec<SearchNode>,
    /// The side the search plays for. Wins are only ever credited to it.
    searcher: Player,
    exploration: f64,
}

impl SearchTree {
    /// New tree whose root is `root_state`; the side to move there is the searcher.
    pub fn new(root_state: GameState, exploration: f64) -> Self {
        let searcher = root_state.current_player();
        let mut nodes = Vec::with_capacity(1024);
        nodes.push(SearchNode::root(root_state));
        SearchTree {
            nodes,
            searcher,
            exploration,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn searcher(&self) -> Player {
        self.searcher
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.index()]
    }

    pub fn child_for(&self, id: NodeId, mv: Move) -> Option<NodeId> {
        self.nodes[id.index()]
            .children
            .iter()
            .copied()
            .find(|&child| self.nodes[child.index()].mv == Some(mv))
    }

    /// Materialize the child reached by `mv`. Reuses an existing child for the
    /// same move.
    pub fn add_child(&mut self, parent: NodeId, mv: Move) -> Result<NodeId, MoveError> {
        if let Some(existing) = self.child_for(parent, mv) {
            return Ok(existing);
        }
        let parent_state = &self.nodes[parent.index()].state;
        let side_played = parent_state.current_player();
        let state = parent_state.with_move(mv)?;

        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(SearchNode::child(parent, state, mv, side_played));
        self.nodes[parent.index()].children.push(id);
        Ok(id)
    }

    pub fn mark_terminal(&mut self, id: NodeId) {
        self.nodes[id.index()].terminal = true;
    }

    /// Current UCB1 score of `id`. The root has no parent and scores `+inf`.
    pub fn ucb1(&self, id: NodeId) -> f64 {
        let node = &self.nodes[id.index()];
        match node.parent {
            Some(parent) => ucb1(
                node.wins,
                node.visits,
                self.nodes[parent.index()].visits,
                self.exploration,
                node.side_played == self.searcher,
            ),
            None => f64::INFINITY,
        }
    }

    /// Next move to follow from `id`: the first legal move without a child,
    /// otherwise the non-terminal child with the highest UCB1 score (first one
    /// wins ties). `None` when there is no legal move or every child is terminal.
    pub fn select_move(&self, id: NodeId) -> Option<Move> {
        let mut best: Option<(Move, f64)> = None;

        for mv in self.nodes[id.index()].state.legal_moves() {
            let Some(child) = self.child_for(id, mv) else {
                return Some(mv);
            };
            if self.nodes[child.index()].terminal {
                continue;
            }
            let score = self.ucb1(child);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((mv, score));
            }
        }

        best.map(|(mv, _)| mv)
    }

    /// Random-rollout expansion: a child for one uniformly chosen legal move.
    /// Terminal nodes, and nodes without legal moves, return themselves.
    pub fn expand<R: Rng + ?Sized>(&mut self, id: NodeId, rng: &mut R) -> Result<NodeId, MoveError> {
        if self.nodes[id.index()].terminal {
            return Ok(id);
        }
        let legal = self.nodes[id.index()].state.legal_moves();
        if legal.is_empty() {
            self.mark_terminal(id);
            return Ok(id);
        }
        let mv = legal[rng.random_range(0..legal.len())];
        self.add_child(id, mv)
    }

    /// Uniformly chosen existing child of `id`.
    pub fn random_child<R: Rng + ?Sized>(&self, id: NodeId, rng: &mut R) -> Option<NodeId> {
        let children = &self.nodes[id.index()].children;
        if children.is_empty() {
            None
        } else {
            Some(children[rng.random_range(0..children.len())])
        }
    }

    /// Record one simulation result on every node from `leaf` up to the root,
    /// then refresh their cached scores.
    pub fn back_propagate(&mut self, leaf: NodeId, outcome: Outcome) {
        let searcher_won = outcome == Outcome::Winner(self.searcher);

        let mut current = Some(leaf);
        while let Some(id) = current {
            let node = &mut self.nodes[id.index()];
            node.visits += 1;
            if searcher_won && node.side_played == self.searcher {
                node.wins += 1;
            }
            current = node.parent;
        }

        // Second pass: a node's score depends on its parent's updated count.
        let mut current = Some(leaf);
        while let Some(id) = current {
            let score = self.ucb1(id);
            let node = &mut self.nodes[id.index()];
            node.score = score;
            current = node.parent;
        }
    }
}
