//! Terminal UI: human versus computer game view with live search progress.

mod app;
mod game_view;

pub use app::{App, COMPUTER, HUMAN};
