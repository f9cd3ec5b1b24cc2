//! Terminal console built on Ratatui: code pane, output pane and status bar.

pub mod app;
pub mod events;
pub mod handler;
pub mod ui;

pub use handler::{run_tui, Startup};
