//! Recognises the two error shapes the script executor reports.

use std::sync::OnceLock;

use regex::Regex;

use super::Position;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorHint {
    pub position: Position,
    pub message: String,
}

fn syntax_error_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // `.` stops at newlines and `$` is end of text, so only the last line can match.
    PATTERN.get_or_init(|| {
        Regex::new(r".*@ line ([0-9]+), column ([0-9]+).$").expect("syntax error pattern is valid")
    })
}

fn script_frame_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\tat Script1\.run\(Script1\.groovy:([0-9]+)\)$").expect("script frame pattern is valid")
    })
}

/// Locate the error in an executor error text.
///
/// Compilation errors end in `@ line N, column M.` and keep the whole text as
/// message. Runtime exceptions are found through their `Script1.run` stack
/// frame; the message is every unindented line of the dump.
pub fn parse_error_result(result: &str) -> Option<ErrorHint> {
    if let Some(caps) = syntax_error_pattern().captures(result) {
        let line = caps[1].parse::<usize>().ok();
        let column = caps[2].parse::<usize>().ok();
        if let (Some(line), Some(column)) = (line, column) {
            return Some(ErrorHint {
                position: Position::new(line.saturating_sub(1), column.saturating_sub(1)),
                message: result.to_string(),
            });
        }
    }

    let lines: Vec<&str> = result.split('\n').collect();
    let line_number = lines
        .iter()
        .find_map(|line| script_frame_pattern().captures(line))
        .and_then(|caps| caps[1].parse::<usize>().ok())?;

    let message = lines
        .iter()
        .filter(|line| !line.contains('\t'))
        .copied()
        .collect::<Vec<_>>()
        .join("\n");

    Some(ErrorHint {
        position: Position::new(line_number.saturating_sub(1), 0),
        message,
    })
}
