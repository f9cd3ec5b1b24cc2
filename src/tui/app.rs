//! TUI application state management.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::editor::highlight::HighlightCache;
use crate::editor::{CodeEditor, OutputEditor};
use crate::executor::ExecutionResult;
use crate::share::share_url;
use crate::utils::save_script;

/// Which pane receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Code,
    Output,
}

/// Popup display state
#[derive(Debug, Clone, PartialEq)]
pub enum PopupState {
    /// No popup shown
    None,
    /// Share link for the current code
    ShareLink { url: String },
}

/// Application state for the TUI
#[derive(Debug)]
pub struct App {
    /// Code editor session
    pub code: CodeEditor,
    /// Read-only output pane
    pub output: OutputEditor,
    /// Highlighted lines of the code pane
    pub highlights: HighlightCache,
    /// Pane receiving keys
    pub focus: Focus,
    /// Status message to display
    pub status_message: String,
    /// Whether a script is being executed
    pub is_running: bool,
    /// Whether to show help
    pub show_help: bool,
    /// Popup display state
    pub popup_state: PopupState,
    /// Where Ctrl+S writes the code
    pub file_path: Option<PathBuf>,
    /// Console address used for share links
    pub console_base_url: String,
    /// Executor endpoint, shown in the title
    pub executor_url: String,
    /// Compile phase used for AST rendering
    pub ast_phase: String,
    /// Timestamp of last Ctrl+C press for double Ctrl+C detection
    pub last_ctrl_c_time: Option<Instant>,
}

const IDLE_STATUS: &str = "F5 run | F6 ast | Ctrl+L clear errors | Ctrl+S save | Ctrl+U share | F1 help";

impl App {
    pub fn new(console_base_url: String, executor_url: String, file_path: Option<PathBuf>) -> Self {
        Self {
            code: CodeEditor::new(),
            output: OutputEditor::new(),
            highlights: HighlightCache::default(),
            focus: Focus::Code,
            status_message: IDLE_STATUS.to_string(),
            is_running: false,
            show_help: false,
            popup_state: PopupState::None,
            file_path,
            console_base_url,
            executor_url,
            ast_phase: "CONVERSION".to_string(),
            last_ctrl_c_time: None,
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    /// Mark a run as started. Returns false if one is already in flight.
    pub fn start_run(&mut self, ast: bool) -> bool {
        if self.is_running {
            return false;
        }
        self.is_running = true;
        self.code.clear_errors();
        self.status_message = if ast {
            format!("Rendering AST ({})...", self.ast_phase)
        } else {
            "Running...".to_string()
        };
        true
    }

    /// Show a finished run in the output pane and annotate its error, if any.
    pub fn finish_run(&mut self, result: ExecutionResult) {
        self.is_running = false;
        self.output.set_content(&result.render_output());
        if result.has_error() {
            self.code.handle_error_result(&result.err);
            let location = self
                .code
                .lint_markers()
                .first()
                .map(|a| format!(" at line {}", a.from.line + 1))
                .unwrap_or_default();
            self.status_message = format!("Execution failed{location}");
        } else {
            self.status_message = match result.stats.execution_time {
                Some(ms) => format!("Finished in {ms} ms | {IDLE_STATUS}"),
                None => format!("Finished | {IDLE_STATUS}"),
            };
        }
    }

    /// The executor could not be reached or answered with an error status.
    pub fn fail_run(&mut self, error: String) {
        self.is_running = false;
        self.output.set_content(&format!("Execution request failed: {error}"));
        self.status_message = "Execution request failed".to_string();
    }

    pub fn clear_errors(&mut self) {
        self.code.clear_errors();
        self.status_message = IDLE_STATUS.to_string();
    }

    pub fn save(&mut self) -> Result<()> {
        match self.file_path.clone() {
            Some(path) => {
                save_script(&path, &self.code.get_code())?;
                self.status_message = format!("Saved {}", path.display());
            }
            None => {
                self.status_message = "No file given on the command line, nothing saved".to_string();
            }
        }
        Ok(())
    }

    pub fn show_share_link(&mut self) -> Result<()> {
        let url = share_url(&self.console_base_url, &self.code.get_code())?;
        self.popup_state = PopupState::ShareLink { url };
        Ok(())
    }

    /// Toggle help display
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Code => Focus::Output,
            Focus::Output => Focus::Code,
        };
        if self.focus == Focus::Code {
            self.code.buffer_mut().focus();
        } else {
            self.code.buffer_mut().blur();
        }
    }

    /// Hide any popup
    pub fn hide_popup(&mut self) {
        self.popup_state = PopupState::None;
    }

    /// Check if any popup is shown
    pub fn is_popup_shown(&self) -> bool {
        self.popup_state != PopupState::None
    }

    /// Handle Ctrl+C press and detect double press for quit
    /// Returns true if should quit (double Ctrl+C), false otherwise
    pub fn handle_ctrl_c(&mut self) -> bool {
        const DOUBLE_CTRL_C_TIMEOUT: Duration = Duration::from_millis(500);

        let now = Instant::now();

        if let Some(last_time) = self.last_ctrl_c_time {
            if now.duration_since(last_time) <= DOUBLE_CTRL_C_TIMEOUT {
                // Double Ctrl+C detected - quit
                self.last_ctrl_c_time = None;
                return true;
            }
        }

        self.status_message = "Press Ctrl+C again to quit".to_string();
        self.last_ctrl_c_time = Some(now);

        false
    }
}
