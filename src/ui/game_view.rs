use std::time::Duration;

use crate::game::{Board, Cell, GameState, Outcome, Player, COLS, ROWS};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Progress of an in-flight computer search.
pub struct Thinking {
    pub elapsed: Duration,
    pub budget: Duration,
    pub tick: usize,
}

impl Thinking {
    /// Fraction of the time budget used so far, in `[0, 1]`.
    pub fn ratio(&self) -> f64 {
        if self.budget.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / self.budget.as_secs_f64()).clamp(0.0, 1.0)
    }

    pub fn label(&self) -> String {
        format!(
            "{} thinking {:.1}s / {:.1}s",
            SPINNER[self.tick % SPINNER.len()],
            self.elapsed.as_secs_f64(),
            self.budget.as_secs_f64()
        )
    }
}

pub fn render(
    frame: &mut Frame,
    game_state: &GameState,
    selected_column: usize,
    message: Option<&str>,
    last_search: Option<&str>,
    thinking: Option<&Thinking>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(11),   // Board
            Constraint::Length(3), // Search progress / summary
            Constraint::Length(3), // Message
            Constraint::Length(3), // Controls
        ])
        .split(frame.area());

    render_header(frame, game_state, chunks[0]);
    render_board(frame, game_state.board(), selected_column, chunks[1]);
    render_search(frame, last_search, thinking, chunks[2]);
    render_message(frame, message, chunks[3]);
    render_controls(frame, chunks[4]);
}

fn player_color(player: Player) -> Color {
    match player {
        Player::Red => Color::Red,
        Player::Yellow => Color::Yellow,
    }
}

fn render_header(frame: &mut Frame, game_state: &GameState, area: Rect) {
    let current_player = game_state.current_player();

    let status = match game_state.evaluate_outcome() {
        Outcome::InProgress => format!(
            "To move: {} ({})  |  Computer X vs You O",
            current_player.name(),
            current_player.symbol()
        ),
        Outcome::Winner(player) => format!("Game Over  |  {} wins", player.name()),
        Outcome::Draw => "Game Over  |  Draw".to_string(),
    };

    let header = Paragraph::new(status)
        .style(
            Style::default()
                .fg(player_color(current_player))
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Connect Four"),
        );

    frame.render_widget(header, area);
}

fn render_board(frame: &mut Frame, board: &Board, selected_column: usize, area: Rect) {
    let mut lines = Vec::new();

    // Column numbers with selection indicator
    let mut col_line = vec![Span::raw("   ")];
    for col in 0..COLS {
        let label = format!(" {} ", col + 1);
        if col == selected_column {
            col_line.push(Span::styled(
                label,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            ));
        } else {
            col_line.push(Span::raw(label));
        }
    }
    col_line.push(Span::raw("  "));
    lines.push(Line::from(col_line));

    lines.push(Line::from("  ╔═══════════════════════╗"));

    for row in 0..ROWS {
        let mut row_spans = vec![Span::raw("  ║")];
        for col in 0..COLS {
            let cell = board.get(row, col);
            let color = match cell.player() {
                Some(player) => player_color(player),
                None => Color::DarkGray,
            };
            let symbol = match cell {
                Cell::Empty => '.',
                _ => cell.symbol(),
            };
            row_spans.push(Span::styled(
                format!(" {symbol} "),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ));
        }
        row_spans.push(Span::raw("  ║"));
        lines.push(Line::from(row_spans));
    }

    lines.push(Line::from("  ╚═══════════════════════╝"));

    let mut indicator_line = vec![Span::raw("   ")];
    for col in 0..COLS {
        if col == selected_column {
            indicator_line.push(Span::styled(" ▲ ", Style::default().fg(Color::Cyan)));
        } else {
            indicator_line.push(Span::raw("   "));
        }
    }
    indicator_line.push(Span::raw("  "));
    lines.push(Line::from(indicator_line));

    let board_widget = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(board_widget, area);
}

fn render_search(
    frame: &mut Frame,
    last_search: Option<&str>,
    thinking: Option<&Thinking>,
    area: Rect,
) {
    let block = Block::default().borders(Borders::ALL).title("Computer");

    match thinking {
        Some(thinking) => {
            let gauge = Gauge::default()
                .block(block)
                .gauge_style(Style::default().fg(Color::Red))
                .ratio(thinking.ratio())
                .label(thinking.label());
            frame.render_widget(gauge, area);
        }
        None => {
            let summary = Paragraph::new(last_search.unwrap_or(""))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(summary, area);
        }
    }
}

fn render_message(frame: &mut Frame, message: Option<&str>, area: Rect) {
    let msg_widget = Paragraph::new(message.unwrap_or(""))
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(msg_widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let controls = Paragraph::new("←/→: Move  |  1-7 / Enter: Drop  |  R: Restart  |  Q: Quit")
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Controls"),
        );

    frame.render_widget(controls, area);
}
