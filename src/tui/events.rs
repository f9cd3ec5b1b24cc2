//! Custom event types for TUI application.

use crossterm::event::KeyEvent;

use crate::executor::ExecutionResult;

/// Events that can occur in the TUI application
#[derive(Debug)]
pub enum TuiEvent {
    /// User keyboard input
    Key(KeyEvent),
    /// Bracketed paste content
    Paste(String),
    /// Request to execute the editor contents
    Run { ast: bool },
    /// Executor answered
    ExecutionFinished(ExecutionResult),
    /// Executor could not be reached or rejected the request
    ExecutionFailed(String),
    /// Request to quit the application
    Quit,
}
