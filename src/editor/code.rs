//! The code editor session.

use tracing::{debug, warn};

use super::buffer::TextBuffer;
use super::errors::parse_error_result;
use super::query::CodeSource;
use super::{Annotation, Position, Severity};
use crate::error::LoadError;
use crate::loaders::CodeLoader;

pub const INDENT_UNIT: usize = 4;

/// Editable Groovy buffer with lint annotations for executor errors.
///
/// Annotations are only rendered after a lint pass; `lint_markers` is what the
/// view draws, `lint_errors` is what the next pass will publish.
#[derive(Debug, Default)]
pub struct CodeEditor {
    buffer: TextBuffer,
    lint_errors: Vec<Annotation>,
    lint_markers: Vec<Annotation>,
    auto_close_brackets: bool,
}

impl CodeEditor {
    pub fn new() -> Self {
        Self { auto_close_brackets: true, ..Self::default() }
    }

    pub fn with_auto_close_brackets(mut self, enabled: bool) -> Self {
        self.auto_close_brackets = enabled;
        self
    }

    pub fn get_code(&self) -> String {
        self.buffer.value()
    }

    pub fn set_code(&mut self, code: &str) {
        self.clear_errors();
        self.buffer.set_value(code);
        self.buffer.refresh();
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut TextBuffer {
        &mut self.buffer
    }

    pub fn cursor(&self) -> Position {
        self.buffer.cursor()
    }

    /// Annotations currently held, rendered or not.
    pub fn annotations(&self) -> &[Annotation] {
        &self.lint_errors
    }

    /// Annotations published by the last lint pass.
    pub fn lint_markers(&self) -> &[Annotation] {
        &self.lint_markers
    }

    /// Add an annotation for an executor error text, if it has a recognised shape.
    pub fn handle_error_result(&mut self, result: &str) {
        match parse_error_result(result) {
            Some(hint) => self.add_error_hint(hint.position, Some(&hint.message)),
            None => debug!("error result has no location, not annotating"),
        }
    }

    /// Focus `position`; with a non-empty `error_text`, mark one char there as an error.
    pub fn add_error_hint(&mut self, position: Position, error_text: Option<&str>) {
        self.buffer.set_cursor(position);
        self.buffer.focus();
        if let Some(text) = error_text.filter(|t| !t.is_empty()) {
            self.lint_errors.push(Annotation {
                from: position,
                to: Position::new(position.line, position.ch + 1),
                message: text.to_string(),
                severity: Severity::Error,
            });
            self.perform_lint();
        }
    }

    pub fn clear_errors(&mut self) {
        self.lint_errors.clear();
        self.perform_lint();
    }

    fn perform_lint(&mut self) {
        self.lint_markers = self.lint_errors.clone();
    }

    /// Errors are only known from the last run, so any edit invalidates them.
    fn on_change(&mut self) {
        if !self.lint_errors.is_empty() {
            self.clear_errors();
        }
    }

    /// Load code selected by a console query string into the editor.
    ///
    /// The editor is only touched when the resolved text is non-empty. Failures
    /// are returned as-is; no other source is tried.
    pub async fn load_from_url<L>(&mut self, query: &str, loader: &L) -> Result<String, LoadError>
    where
        L: CodeLoader + ?Sized,
    {
        let source = CodeSource::from_query(query);
        let code = source.resolve(loader).await.inspect_err(|e| {
            warn!(source = source.kind(), error = %e, "failed to load code from url");
        })?;
        if !code.is_empty() {
            self.set_code(&code);
        }
        Ok(code)
    }

    // ----- editing, as driven by the terminal view -----

    pub fn insert_char(&mut self, c: char) {
        if self.auto_close_brackets {
            if matches!(c, ')' | ']' | '}' | '"' | '\'') && self.buffer.char_at_cursor() == Some(c) {
                self.buffer.move_right();
                return;
            }
            if let Some(close) = closing_bracket(c) {
                self.buffer.insert_char(c);
                self.buffer.insert_char(close);
                self.buffer.move_left();
                self.on_change();
                return;
            }
        }
        self.buffer.insert_char(c);
        self.on_change();
    }

    pub fn insert_str(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.buffer.insert_str(text);
        self.on_change();
    }

    pub fn insert_newline(&mut self) {
        self.buffer.insert_newline();
        self.on_change();
    }

    /// Indent with spaces up to the next multiple of the indent unit.
    pub fn insert_tab(&mut self) {
        let width = INDENT_UNIT - self.buffer.cursor().ch % INDENT_UNIT;
        self.buffer.insert_str(&" ".repeat(width));
        self.on_change();
    }

    pub fn backspace(&mut self) {
        if self.buffer.backspace() {
            self.on_change();
        }
    }

    pub fn delete(&mut self) {
        if self.buffer.delete() {
            self.on_change();
        }
    }
}

fn closing_bracket(c: char) -> Option<char> {
    match c {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        '"' => Some('"'),
        '\'' => Some('\''),
        _ => None,
    }
}
