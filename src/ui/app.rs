use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent};
use ratatui::{backend::Backend, Terminal};
use tracing::{debug, info, warn};

use super::game_view::{self, Thinking};
use crate::ai::mcts::{MctsConfig, MctsEngine, SearchReport};
use crate::config::Starter;
use crate::error::SearchError;
use crate::game::{GameState, Move, MoveError, Outcome, Player, COLS};

/// The automated side.
pub const COMPUTER: Player = Player::Red;
/// The interactive side.
pub const HUMAN: Player = Player::Yellow;

/// A computer move being searched on a worker thread.
struct PendingSearch {
    rx: Receiver<Result<SearchReport, SearchError>>,
    stop: Arc<AtomicBool>,
    started: Instant,
}

pub struct App {
    game_state: GameState,
    config: MctsConfig,
    starter: Starter,
    selected_column: usize,
    should_quit: bool,
    message: Option<String>,
    pending: Option<PendingSearch>,
    last_search: Option<String>,
    tick: usize,
}

impl App {
    pub fn new(config: MctsConfig, starter: Starter) -> Self {
        App {
            game_state: GameState::new(starter.player()),
            config,
            starter,
            selected_column: COLS / 2,
            should_quit: false,
            message: None,
            pending: None,
            last_search: None,
            tick: 0,
        }
    }

    /// Main application loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            self.poll_search();
            if self.computer_to_move() && self.pending.is_none() {
                self.start_search();
            }

            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            self.handle_events()?;
            self.tick = self.tick.wrapping_add(1);
        }
        self.cancel_search();
        Ok(())
    }

    pub fn game_state(&self) -> &GameState {
        &self.game_state
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_thinking(&self) -> bool {
        self.pending.is_some()
    }

    fn computer_to_move(&self) -> bool {
        self.game_state.current_player() == COMPUTER
            && self.game_state.evaluate_outcome() == Outcome::InProgress
    }

    /// Launch a search on a clone of the live state.
    fn start_search(&mut self) {
        let (tx, rx) = mpsc::channel();
        let state = self.game_state.clone();
        let config = self.config.clone();
        let stop = Arc::new(AtomicBool::new(false));
        let worker_stop = Arc::clone(&stop);

        debug!(budget_ms = config.time_budget_ms, "starting computer search");
        thread::spawn(move || {
            let mut engine = MctsEngine::new(config).with_stop_flag(worker_stop);
            // The receiver is gone if the game was restarted meanwhile.
            let _ = tx.send(engine.search(&state));
        });

        self.pending = Some(PendingSearch {
            rx,
            stop,
            started: Instant::now(),
        });
    }

    /// Apply the computer's move once the worker delivers it.
    fn poll_search(&mut self) {
        let Some(pending) = &self.pending else {
            return;
        };

        let result = match pending.rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                warn!("search worker exited without a result");
                self.pending = None;
                self.message = Some("Computer search failed. Press 'r' to restart.".to_string());
                return;
            }
        };
        self.pending = None;

        match result {
            Ok(report) => {
                let summary = format!(
                    "Computer played {} ({} iterations, {} nodes, {:.1}s, {:?})",
                    report.chosen,
                    report.iterations,
                    report.tree_size,
                    report.elapsed.as_secs_f64(),
                    report.reason,
                );
                info!(
                    column = report.chosen.column() + 1,
                    iterations = report.iterations,
                    "computer move"
                );
                match self.game_state.apply_move(report.chosen) {
                    Ok(()) => {
                        self.last_search = Some(summary);
                        self.announce_outcome();
                    }
                    Err(e) => self.message = Some(format!("Computer move rejected: {e}")),
                }
            }
            Err(e) => {
                warn!(error = %e, "search failed");
                self.message = Some(format!("Computer could not move: {e}"));
            }
        }
    }

    /// Handle keyboard events
    fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                self.handle_key(key);
            }
        }
        Ok(())
    }

    /// Handle key press
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Left => {
                if self.selected_column > 0 {
                    self.selected_column -= 1;
                }
            }
            KeyCode::Right => {
                if self.selected_column < COLS - 1 {
                    self.selected_column += 1;
                }
            }
            KeyCode::Char(c @ '1'..='7') => {
                self.selected_column = (c as usize) - ('1' as usize);
                self.drop_piece();
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.drop_piece();
            }
            KeyCode::Char('r') => {
                self.restart();
            }
            _ => {}
        }
    }

    /// Ask the worker to stop after its current iteration and forget it.
    fn cancel_search(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.stop.store(true, Ordering::Relaxed);
            debug!("computer search cancelled");
        }
    }

    fn restart(&mut self) {
        self.cancel_search();
        self.game_state = GameState::new(self.starter.player());
        self.selected_column = COLS / 2;
        self.last_search = None;
        self.message = Some("New game started!".to_string());
        info!(first = ?self.starter, "new game");
    }

    /// Drop the human's piece in the selected column
    fn drop_piece(&mut self) {
        if self.game_state.evaluate_outcome().is_decided() {
            self.message = Some("Game over! Press 'r' to restart.".to_string());
            return;
        }
        if self.game_state.current_player() != HUMAN || self.pending.is_some() {
            self.message = Some("Wait for the computer to move.".to_string());
            return;
        }

        match self.game_state.apply_move(Move::new(self.selected_column)) {
            Ok(()) => {
                self.message = None;
                self.announce_outcome();
            }
            Err(MoveError::ColumnFull(_)) => {
                self.message = Some("Column is full!".to_string());
            }
            Err(MoveError::InvalidColumn(_)) => {
                self.message = Some("Invalid column!".to_string());
            }
        }
    }

    fn announce_outcome(&mut self) {
        let text = match self.game_state.evaluate_outcome() {
            Outcome::InProgress => return,
            Outcome::Winner(COMPUTER) => "The computer wins!",
            Outcome::Winner(_) => "Well done, the computer lost!",
            Outcome::Draw => "It's a draw!",
        };
        info!(outcome = ?self.game_state.evaluate_outcome(), "game over");
        self.message = Some(text.to_string());
    }

    /// Render the UI
    fn render(&self, frame: &mut ratatui::Frame) {
        let thinking = self.pending.as_ref().map(|p| Thinking {
            elapsed: p.started.elapsed(),
            budget: self.config.time_budget(),
            tick: self.tick,
        });
        game_view::render(
            frame,
            &self.game_state,
            self.selected_column,
            self.message.as_deref(),
            self.last_search.as_deref(),
            thinking.as_ref(),
        );
    }
}
