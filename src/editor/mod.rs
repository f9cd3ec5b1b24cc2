//! Editor widgets: the code editor session and the read-only output pane.

pub mod buffer;
pub mod code;
pub mod errors;
pub mod highlight;
pub mod output;
pub mod query;

pub use code::CodeEditor;
pub use output::OutputEditor;
pub use query::CodeSource;

/// Zero-based line and character column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub ch: usize,
}

impl Position {
    pub fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }
}

/// Executor errors are the only source of annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
}

/// Marker rendered in the gutter and inline by the lint pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub from: Position,
    pub to: Position,
    pub message: String,
    pub severity: Severity,
}

impl Annotation {
    pub fn covers_line(&self, line: usize) -> bool {
        self.from.line <= line && line <= self.to.line
    }
}
