//! Time-bounded UCT search driver.
//!
//! Each call builds a fresh [`SearchTree`] from a clone of the given position
//! and runs selection, rollout and back-propagation until the time budget is
//! spent or the tree is exhausted. The budget is checked between iterations
//! only, and at least one iteration always runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use super::config::{FinalSelection, MctsConfig};
use super::node::NodeId;
use super::tree::SearchTree;
use crate::error::SearchError;
use crate::game::{GameState, Move, MoveError, Outcome};

/// Why a search returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The engine could win on the spot; no search ran.
    ImmediateWin,
    /// The opponent threatened an immediate win; no search ran.
    Block,
    /// Time budget spent.
    Budget,
    /// `iteration_limit` reached.
    IterationLimit,
    /// Every reachable line was resolved.
    Exhausted,
    /// The stop flag was raised by the caller.
    Cancelled,
}

/// Statistics of one root child after the search.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildStats {
    pub mv: Move,
    pub visits: u32,
    pub wins: u32,
    pub win_ratio: f64,
    pub terminal: bool,
}

#[derive(Debug, Clone)]
pub struct SearchReport {
    pub chosen: Move,
    pub reason: StopReason,
    pub iterations: u64,
    pub tree_size: usize,
    pub elapsed: Duration,
    pub root_children: Vec<ChildStats>,
}

/// UCT search engine. The rollout RNG is injectable for reproducible tests.
pub struct MctsEngine<R: Rng = StdRng> {
    config: MctsConfig,
    rng: R,
    stop: Option<Arc<AtomicBool>>,
}

impl MctsEngine<StdRng> {
    /// Engine seeded from `config.seed`, or from OS entropy when unset.
    pub fn new(config: MctsConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> MctsEngine<R> {
    pub fn with_rng(config: MctsConfig, rng: R) -> Self {
        MctsEngine {
            config,
            rng,
            stop: None,
        }
    }

    /// Abort searches once `flag` is set. Checked between iterations, like the
    /// time budget.
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop = Some(flag);
        self
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Pick the move to play in `state` within `time_budget`. The caller
    /// applies it to the live game.
    pub fn choose_move(&mut self, state: &GameState, time_budget: Duration) -> Result<Move, SearchError> {
        self.run(state, time_budget).map(|report| report.chosen)
    }

    /// Full search with the configured budget, returning statistics.
    pub fn search(&mut self, state: &GameState) -> Result<SearchReport, SearchError> {
        let budget = self.config.time_budget();
        self.run(state, budget)
    }

    fn run(&mut self, state: &GameState, budget: Duration) -> Result<SearchReport, SearchError> {
        if state.evaluate_outcome().is_decided() {
            return Err(SearchError::GameOver);
        }
        let legal = state.legal_moves();
        let Some(&fallback) = legal.first() else {
            return Err(SearchError::NoLegalMoves);
        };

        let start = Instant::now();

        if let Some((mv, reason)) = self.tactical_move(state) {
            debug!(chosen = %mv, ?reason, "tactical move, search skipped");
            return Ok(SearchReport {
                chosen: mv,
                reason,
                iterations: 0,
                tree_size: 0,
                elapsed: start.elapsed(),
                root_children: Vec::new(),
            });
        }

        let mut tree = SearchTree::new(state.clone(), self.config.exploration_constant);
        let mut iterations = 0u64;

        let reason = loop {
            let Some(selected) = self.select(&mut tree)? else {
                break StopReason::Exhausted;
            };
            let (leaf, outcome) = self.simulate(&mut tree, selected)?;
            tree.back_propagate(leaf, outcome);
            iterations += 1;

            if self.config.iteration_limit.is_some_and(|limit| iterations >= limit) {
                break StopReason::IterationLimit;
            }
            if self.stop.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                break StopReason::Cancelled;
            }
            if start.elapsed() >= budget {
                break StopReason::Budget;
            }
        };

        let chosen = self.final_choice(&tree).unwrap_or(fallback);
        let root_children = root_stats(&tree);
        let elapsed = start.elapsed();

        for child in &root_children {
            trace!(
                mv = %child.mv,
                visits = child.visits,
                wins = child.wins,
                ratio = child.win_ratio,
                terminal = child.terminal,
                "root child"
            );
        }
        debug!(
            chosen = %chosen,
            ?reason,
            iterations,
            nodes = tree.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "search finished"
        );

        Ok(SearchReport {
            chosen,
            reason,
            iterations,
            tree_size: tree.len(),
            elapsed,
            root_children,
        })
    }

    /// A winning move for the side to move, or else (when enabled) the column
    /// that stops the opponent's immediate win.
    fn tactical_move(&self, state: &GameState) -> Option<(Move, StopReason)> {
        if let Some(&win) = state.winning_moves().first() {
            return Some((win, StopReason::ImmediateWin));
        }
        if !self.config.block_immediate_threats {
            return None;
        }
        let opponent_view = GameState::from_board(*state.board(), state.current_player().other());
        opponent_view
            .winning_moves()
            .first()
            .map(|&threat| (threat, StopReason::Block))
    }

    /// Descend from the root following `select_move`. Returns the node to
    /// simulate from, or `None` once the root itself is exhausted.
    fn select(&mut self, tree: &mut SearchTree) -> Result<Option<NodeId>, MoveError> {
        let mut current = tree.root();
        loop {
            match tree.select_move(current) {
                None => {
                    tree.mark_terminal(current);
                    match tree.get(current).parent() {
                        Some(parent) => current = parent,
                        None => return Ok(None),
                    }
                }
                Some(mv) => match tree.child_for(current, mv) {
                    None => return tree.add_child(current, mv).map(Some),
                    Some(child) if tree.get(child).children().is_empty() => {
                        return Ok(Some(child))
                    }
                    Some(child) => current = child,
                },
            }
        }
    }

    /// Random rollout from `start` to a decided position. Rollout positions are
    /// added to the tree until it holds `max_nodes`; beyond that the rest of the
    /// game is played on a scratch copy and the result is credited to the last
    /// materialized node.
    fn simulate(&mut self, tree: &mut SearchTree, start: NodeId) -> Result<(NodeId, Outcome), MoveError> {
        let mut current = start;
        loop {
            let outcome = tree.get(current).state().evaluate_outcome();
            if outcome.is_decided() {
                tree.mark_terminal(current);
                return Ok((current, outcome));
            }
            if tree.len() >= self.config.max_nodes {
                let outcome = self.playout(tree.get(current).state().clone())?;
                return Ok((current, outcome));
            }

            let next = tree.expand(current, &mut self.rng)?;
            current = if next != current {
                next
            } else {
                // Exhausted subtree: every reply already has a resolved child.
                match tree.random_child(current, &mut self.rng) {
                    Some(child) => child,
                    None => return Ok((current, outcome)),
                }
            };
        }
    }

    fn playout(&mut self, mut state: GameState) -> Result<Outcome, MoveError> {
        loop {
            let outcome = state.evaluate_outcome();
            let legal = state.legal_moves();
            if outcome.is_decided() || legal.is_empty() {
                return Ok(outcome);
            }
            let mv = legal[self.rng.random_range(0..legal.len())];
            state.apply_move(mv)?;
        }
    }

    /// Best root child under the configured policy; ties keep the earliest.
    fn final_choice(&self, tree: &SearchTree) -> Option<Move> {
        let children = tree.get(tree.root()).children();
        let nodes = children.iter().map(|&id| tree.get(id));

        let best = match self.config.final_selection {
            // Unvisited children carry the +inf sentinel and are not preferred.
            FinalSelection::Max => first_max_by(nodes.filter(|n| n.visits() > 0), |n| n.win_ratio()),
            FinalSelection::Robust => first_max_by(nodes, |n| n.visits() as f64),
        };

        best.or_else(|| children.first().map(|&id| tree.get(id)))
            .and_then(|node| node.mv())
    }
}

fn first_max_by<T, I, F>(items: I, key: F) -> Option<T>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> f64,
{
    let mut best: Option<(T, f64)> = None;
    for item in items {
        let value = key(&item);
        if best.as_ref().map_or(true, |(_, best_value)| value > *best_value) {
            best = Some((item, value));
        }
    }
    best.map(|(item, _)| item)
}

fn root_stats(tree: &SearchTree) -> Vec<ChildStats> {
    tree.get(tree.root())
        .children()
        .iter()
        .filter_map(|&id| {
            let node = tree.get(id);
            node.mv().map(|mv| ChildStats {
                mv,
                visits: node.visits(),
                wins: node.wins(),
                win_ratio: node.win_ratio(),
                terminal: node.is_terminal(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Board, Player, COLS};

    fn engine(config: MctsConfig) -> MctsEngine<StdRng> {
        MctsEngine::with_rng(config, StdRng::seed_from_u64(42))
    }

    fn play(state: &mut GameState, cols: &[usize]) {
        for &col in cols {
            state.apply_move(Move::new(col)).unwrap();
        }
    }

    #[test]
    fn test_returns_legal_move_from_empty_board() {
        let state = GameState::new(Player::Red);
        let report = engine(MctsConfig::for_testing()).search(&state).unwrap();
        assert!(state.is_legal(report.chosen));
        assert_eq!(report.reason, StopReason::IterationLimit);
        assert_eq!(report.iterations, 500);
        assert_eq!(report.root_children.len(), COLS);
    }

    #[test]
    fn test_root_visits_equal_iterations() {
        let state = GameState::new(Player::Yellow);
        let mut engine = engine(MctsConfig::for_testing().with_iteration_limit(Some(64)));
        let report = engine.search(&state).unwrap();
        let child_visits: u32 = report.root_children.iter().map(|c| c.visits).sum();
        // Every iteration passes through exactly one root child.
        assert_eq!(child_visits as u64, report.iterations);
    }

    #[test]
    fn test_zero_budget_still_runs_one_iteration() {
        let state = GameState::new(Player::Red);
        let mut engine = engine(MctsConfig::default().with_seed(Some(1)));
        let report = engine.run(&state, Duration::ZERO).unwrap();
        assert_eq!(report.iterations, 1);
        assert_eq!(report.reason, StopReason::Budget);
        assert!(state.is_legal(report.chosen));

        let mv = engine.choose_move(&state, Duration::ZERO).unwrap();
        assert!(state.is_legal(mv));
    }

    #[test]
    fn test_takes_immediate_win_regardless_of_search() {
        let mut state = GameState::new(Player::Red);
        play(&mut state, &[0, 0, 1, 1, 2, 2]);
        // Red to move, three in the bottom row.
        let report = engine(MctsConfig::for_testing()).search(&state).unwrap();
        assert_eq!(report.chosen, Move::new(3));
        assert_eq!(report.reason, StopReason::ImmediateWin);

        let mut zero_budget = engine(MctsConfig::default());
        assert_eq!(
            zero_budget.choose_move(&state, Duration::ZERO).unwrap(),
            Move::new(3)
        );
    }

    #[test]
    fn test_prefers_win_over_block() {
        // Both sides threaten column 3; Red (to move) must win rather than block.
        let board: Board = "
            . . . . . . .
            . . . . . . .
            . . . . . . .
            . . . . . . .
            . . . . . . .
            X X X . O O O
        "
        .parse()
        .unwrap();
        let state = GameState::from_board(board, Player::Red);
        let mv = engine(MctsConfig::for_testing()).search(&state).unwrap().chosen;
        assert_eq!(mv, Move::new(3));
    }

    #[test]
    fn test_blocks_opponent_threat() {
        let mut state = GameState::new(Player::Red);
        // Yellow builds 0,1,2 on the bottom row; Red plays elsewhere.
        play(&mut state, &[6, 0, 6, 1, 5, 2]);
        let config = MctsConfig::for_testing().with_threat_blocking(true);
        let report = engine(config).search(&state).unwrap();
        assert_eq!(report.chosen, Move::new(3));
        assert_eq!(report.reason, StopReason::Block);
    }

    #[test]
    fn test_blocking_can_be_disabled() {
        let mut state = GameState::new(Player::Red);
        play(&mut state, &[6, 0, 6, 1, 5, 2]);
        let config = MctsConfig::for_testing()
            .with_threat_blocking(false)
            .with_iteration_limit(Some(50));
        let report = engine(config).search(&state).unwrap();
        assert_ne!(report.reason, StopReason::Block);
        assert_eq!(report.iterations, 50);
    }

    #[test]
    fn test_finished_game_is_an_error() {
        let mut state = GameState::new(Player::Red);
        play(&mut state, &[0, 1, 0, 1, 0, 1, 0]);
        assert_eq!(
            engine(MctsConfig::for_testing()).search(&state).unwrap_err(),
            SearchError::GameOver
        );
    }

    #[test]
    fn test_last_free_cell_exhausts_tree() {
        // One empty cell left (top of column 6); filling it cannot win.
        let board: Board = "
            X X O O X X .
            O O X X O O X
            X X O O X X O
            O O X X O O X
            X X O O X X O
            O O X X O O X
        "
        .parse()
        .unwrap();
        let state = GameState::from_board(board, Player::Yellow);
        let report = engine(MctsConfig::for_testing()).search(&state).unwrap();
        assert_eq!(report.chosen, Move::new(6));
        assert_eq!(report.reason, StopReason::Exhausted);
        assert_eq!(report.iterations, 1);
        assert!(report.root_children[0].terminal);
    }

    #[test]
    fn test_exhausted_child_hands_selection_back_to_its_parent() {
        // Two empty cells (tops of columns 5 and 6) and no possible win: each
        // root child has a single drawn continuation.
        let board: Board = "
            X X O O X . .
            O O X X O O X
            X X O O X X O
            O O X X O O X
            X X O O X X O
            O O X X O O X
        "
        .parse()
        .unwrap();
        let state = GameState::from_board(board, Player::Yellow);
        let config = MctsConfig::for_testing().with_threat_blocking(false);
        let report = engine(config).search(&state).unwrap();

        assert_eq!(report.reason, StopReason::Exhausted);
        assert_eq!(report.iterations, 2);
        // Root, two children and one grandchild under each.
        assert_eq!(report.tree_size, 5);
        assert_eq!(report.root_children.len(), 2);
        for child in &report.root_children {
            assert!(child.terminal, "{:?} should be resolved", child.mv);
            assert_eq!(child.visits, 1);
        }
        assert!(state.is_legal(report.chosen));
    }

    #[test]
    fn test_raised_stop_flag_cancels_after_one_iteration() {
        let state = GameState::new(Player::Red);
        let flag = Arc::new(AtomicBool::new(true));
        let mut engine = engine(MctsConfig::for_testing()).with_stop_flag(flag);
        let report = engine.search(&state).unwrap();
        assert_eq!(report.reason, StopReason::Cancelled);
        assert_eq!(report.iterations, 1);
        assert!(state.is_legal(report.chosen));
    }

    #[test]
    fn test_stop_flag_raised_mid_search() {
        let state = GameState::new(Player::Red);
        let flag = Arc::new(AtomicBool::new(false));
        let config = MctsConfig::for_testing()
            .with_iteration_limit(None)
            .with_time_budget_ms(60_000);
        let mut engine = engine(config).with_stop_flag(Arc::clone(&flag));

        let raiser = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            flag.store(true, Ordering::Relaxed);
        });
        let report = engine.search(&state).unwrap();
        raiser.join().unwrap();

        assert_eq!(report.reason, StopReason::Cancelled);
        assert!(report.elapsed < Duration::from_secs(30));
    }

    #[test]
    fn test_robust_and_max_both_pick_legal_moves() {
        let mut state = GameState::new(Player::Red);
        play(&mut state, &[3, 3, 2]);
        for selection in [FinalSelection::Max, FinalSelection::Robust] {
            let config = MctsConfig::for_testing().with_final_selection(selection);
            let report = engine(config).search(&state).unwrap();
            assert!(state.is_legal(report.chosen));
        }
    }

    #[test]
    fn test_robust_picks_most_visited_child() {
        let state = GameState::new(Player::Red);
        let config = MctsConfig::for_testing().with_final_selection(FinalSelection::Robust);
        let report = engine(config).search(&state).unwrap();
        let max_visits = report.root_children.iter().map(|c| c.visits).max().unwrap();
        let first_max = report
            .root_children
            .iter()
            .find(|c| c.visits == max_visits)
            .unwrap();
        assert_eq!(report.chosen, first_max.mv);
    }

    #[test]
    fn test_max_ignores_unvisited_sentinel() {
        let mut tree = SearchTree::new(GameState::new(Player::Red), 1.0);
        let root = tree.root();
        let visited = tree.add_child(root, Move::new(4)).unwrap();
        tree.add_child(root, Move::new(1)).unwrap(); // never visited, ratio +inf
        tree.back_propagate(visited, Outcome::Winner(Player::Yellow));

        let engine = engine(MctsConfig::default());
        assert_eq!(engine.final_choice(&tree), Some(Move::new(4)));
    }

    #[test]
    fn test_node_cap_falls_back_to_scratch_playouts() {
        let state = GameState::new(Player::Red);
        let config = MctsConfig::for_testing()
            .with_max_nodes(50)
            .with_iteration_limit(Some(200));
        let report = engine(config).search(&state).unwrap();
        assert_eq!(report.iterations, 200);
        // The cap is checked before each rollout step, so the arena overshoots
        // by at most one selection node per iteration.
        assert!(report.tree_size <= 50 + 200);
        assert!(state.is_legal(report.chosen));
    }

    #[test]
    fn test_same_seed_same_result() {
        let mut state = GameState::new(Player::Red);
        play(&mut state, &[3, 2]);
        let a = engine(MctsConfig::for_testing()).search(&state).unwrap();
        let b = engine(MctsConfig::for_testing()).search(&state).unwrap();
        assert_eq!(a.chosen, b.chosen);
        assert_eq!(a.root_children, b.root_children);
    }

    #[test]
    fn test_first_max_by_keeps_earliest_tie() {
        let items = [(0, 1.0), (1, 3.0), (2, 3.0), (3, 2.0)];
        let best = first_max_by(items.iter(), |(_, v)| *v).unwrap();
        assert_eq!(best.0, 1);
        assert!(first_max_by(Vec::<f64>::new(), |v| *v).is_none());
    }
}
