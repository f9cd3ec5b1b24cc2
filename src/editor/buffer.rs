//! Line-based text widget state: contents, cursor, focus and refresh tracking.

use super::Position;

/// Convert a character index (0-based) to a byte index in the given string.
/// If `n` exceeds the number of characters, returns `s.len()`.
pub fn char_to_byte_index(s: &str, n: usize) -> usize {
    match s.char_indices().nth(n) {
        Some((i, _)) => i,
        None => s.len(),
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[derive(Debug, Clone)]
pub struct TextBuffer {
    lines: Vec<String>,
    cursor: Position,
    focused: bool,
    /// Incremented whenever a full redraw was requested.
    refreshes: u64,
    /// First visible line.
    pub scroll: usize,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self {
            lines: vec![String::new()],
            cursor: Position::default(),
            focused: false,
            refreshes: 0,
            scroll: 0,
        }
    }
}

impl TextBuffer {
    pub fn value(&self) -> String {
        self.lines.join("\n")
    }

    /// Replace the whole contents; the cursor returns to the start.
    pub fn set_value(&mut self, text: &str) {
        self.lines = text.split('\n').map(str::to_string).collect();
        self.cursor = Position::default();
        self.scroll = 0;
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line(&self, idx: usize) -> Option<&str> {
        self.lines.get(idx).map(String::as_str)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    /// Moves the cursor, clamping to the existing text.
    pub fn set_cursor(&mut self, pos: Position) {
        let line = pos.line.min(self.lines.len().saturating_sub(1));
        let ch = pos.ch.min(char_len(&self.lines[line]));
        self.cursor = Position { line, ch };
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn refresh(&mut self) {
        self.refreshes += 1;
    }

    pub fn refresh_count(&self) -> u64 {
        self.refreshes
    }

    /// Char under (or right after) the cursor.
    pub fn char_at_cursor(&self) -> Option<char> {
        self.lines[self.cursor.line].chars().nth(self.cursor.ch)
    }

    fn cursor_byte(&self) -> usize {
        char_to_byte_index(&self.lines[self.cursor.line], self.cursor.ch)
    }

    pub fn insert_char(&mut self, c: char) {
        if c == '\n' {
            self.split_line();
            return;
        }
        let at = self.cursor_byte();
        self.lines[self.cursor.line].insert(at, c);
        self.cursor.ch += 1;
    }

    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars().filter(|c| *c != '\r') {
            self.insert_char(c);
        }
    }

    /// Breaks the current line at the cursor, carrying over its indentation.
    pub fn insert_newline(&mut self) {
        let indent: String = self.lines[self.cursor.line]
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect();
        self.split_line();
        self.insert_str(&indent);
    }

    fn split_line(&mut self) {
        let at = self.cursor_byte();
        let tail = self.lines[self.cursor.line].split_off(at);
        self.lines.insert(self.cursor.line + 1, tail);
        self.cursor = Position { line: self.cursor.line + 1, ch: 0 };
    }

    /// Deletes the char before the cursor, joining lines at column 0.
    pub fn backspace(&mut self) -> bool {
        if self.cursor.ch > 0 {
            let line = &mut self.lines[self.cursor.line];
            let at = char_to_byte_index(line, self.cursor.ch - 1);
            line.remove(at);
            self.cursor.ch -= 1;
            true
        } else if self.cursor.line > 0 {
            let current = self.lines.remove(self.cursor.line);
            self.cursor.line -= 1;
            let prev = &mut self.lines[self.cursor.line];
            self.cursor.ch = char_len(prev);
            prev.push_str(&current);
            true
        } else {
            false
        }
    }

    /// Deletes the char under the cursor, joining with the next line at line end.
    pub fn delete(&mut self) -> bool {
        let len = char_len(&self.lines[self.cursor.line]);
        if self.cursor.ch < len {
            let at = self.cursor_byte();
            self.lines[self.cursor.line].remove(at);
            true
        } else if self.cursor.line + 1 < self.lines.len() {
            let next = self.lines.remove(self.cursor.line + 1);
            self.lines[self.cursor.line].push_str(&next);
            true
        } else {
            false
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor.ch > 0 {
            self.cursor.ch -= 1;
        } else if self.cursor.line > 0 {
            self.cursor.line -= 1;
            self.cursor.ch = char_len(&self.lines[self.cursor.line]);
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor.ch < char_len(&self.lines[self.cursor.line]) {
            self.cursor.ch += 1;
        } else if self.cursor.line + 1 < self.lines.len() {
            self.cursor = Position { line: self.cursor.line + 1, ch: 0 };
        }
    }

    pub fn move_up(&mut self) {
        if self.cursor.line > 0 {
            self.set_cursor(Position { line: self.cursor.line - 1, ch: self.cursor.ch });
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor.line + 1 < self.lines.len() {
            self.set_cursor(Position { line: self.cursor.line + 1, ch: self.cursor.ch });
        }
    }

    pub fn move_home(&mut self) {
        self.cursor.ch = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor.ch = char_len(&self.lines[self.cursor.line]);
    }

    /// Keeps the cursor line within a viewport of `height` lines.
    pub fn scroll_to_cursor(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.cursor.line < self.scroll {
            self.scroll = self.cursor.line;
        } else if self.cursor.line >= self.scroll + height {
            self.scroll = self.cursor.line + 1 - height;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(text: &str) -> TextBuffer {
        let mut b = TextBuffer::default();
        b.set_value(text);
        b
    }

    #[test]
    fn value_round_trips_trailing_newline() {
        let b = buffer("a\n\nb\n");
        assert_eq!(b.line_count(), 4);
        assert_eq!(b.value(), "a\n\nb\n");
    }

    #[test]
    fn cursor_is_clamped() {
        let mut b = buffer("ab\ncdé");
        b.set_cursor(Position { line: 9, ch: 9 });
        assert_eq!(b.cursor(), Position { line: 1, ch: 3 });
    }

    #[test]
    fn insert_handles_multibyte_chars() {
        let mut b = buffer("héllo");
        b.set_cursor(Position { line: 0, ch: 2 });
        b.insert_char('X');
        assert_eq!(b.value(), "héXllo");
        assert_eq!(b.cursor(), Position { line: 0, ch: 3 });
    }

    #[test]
    fn newline_keeps_indentation() {
        let mut b = buffer("    foo()");
        b.move_end();
        b.insert_newline();
        assert_eq!(b.value(), "    foo()\n    ");
        assert_eq!(b.cursor(), Position { line: 1, ch: 4 });
    }

    #[test]
    fn backspace_joins_lines() {
        let mut b = buffer("ab\ncd");
        b.set_cursor(Position { line: 1, ch: 0 });
        assert!(b.backspace());
        assert_eq!(b.value(), "abcd");
        assert_eq!(b.cursor(), Position { line: 0, ch: 2 });
        b.set_cursor(Position { line: 0, ch: 0 });
        assert!(!b.backspace());
    }

    #[test]
    fn delete_joins_next_line() {
        let mut b = buffer("ab\ncd");
        b.move_end();
        assert!(b.delete());
        assert_eq!(b.value(), "abcd");
    }

    #[test]
    fn scroll_follows_cursor() {
        let mut b = buffer(&"x\n".repeat(20));
        b.set_cursor(Position { line: 15, ch: 0 });
        b.scroll_to_cursor(10);
        assert_eq!(b.scroll, 6);
        b.set_cursor(Position { line: 2, ch: 0 });
        b.scroll_to_cursor(10);
        assert_eq!(b.scroll, 2);
    }
}
