//! Colored printing for headless modes.

use owo_colors::OwoColorize;

use gconsole::editor::Position;
use gconsole::executor::ExecutionResult;

pub struct TextPrinter {
    pub color: bool,
}

impl TextPrinter {
    pub fn print(&self, text: &str, color: Option<&'static str>) {
        match color.filter(|_| self.color) {
            Some("green") => println!("{}", text.green()),
            Some("cyan") => println!("{}", text.cyan()),
            Some("red") => println!("{}", text.red()),
            Some("yellow") => println!("{}", text.yellow()),
            _ => println!("{}", text),
        }
    }

    /// Print an executor answer: stdout, result, then errors with their location.
    pub fn print_result(&self, result: &ExecutionResult, error_at: Option<Position>) {
        if !result.out.is_empty() {
            print!("{}", result.out);
            if !result.out.ends_with('\n') {
                println!();
            }
        }
        match &result.result {
            serde_json::Value::Null => {}
            serde_json::Value::String(s) => self.print(&format!("Result: {s}"), Some("green")),
            other => self.print(&format!("Result: {other}"), Some("green")),
        }
        if result.has_error() {
            if let Some(pos) = error_at {
                self.print(&format!("error at line {}, column {}:", pos.line + 1, pos.ch + 1), Some("yellow"));
            }
            self.print(&result.err, Some("red"));
        }
        if let Some(ms) = result.stats.execution_time {
            self.print(&format!("({ms} ms)"), Some("cyan"));
        }
    }
}
