//! Read-only pane for execution results.

/// Holds the last execution output; there is no editing API.
#[derive(Debug, Default)]
pub struct OutputEditor {
    content: String,
    refreshes: u64,
    scroll: usize,
}

impl OutputEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_content(&mut self, text: &str) {
        self.content = text.to_string();
        self.scroll = 0;
        self.refresh();
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn refresh(&mut self) {
        self.refreshes += 1;
    }

    pub fn refresh_count(&self) -> u64 {
        self.refreshes
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn scroll_down(&mut self) {
        let max = self.content.lines().count().saturating_sub(1);
        self.scroll = (self.scroll + 1).min(max);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_content_replaces_and_resets_scroll() {
        let mut out = OutputEditor::new();
        out.set_content("a\nb\nc");
        out.scroll_down();
        out.scroll_down();
        out.scroll_down();
        assert_eq!(out.scroll(), 2);

        out.set_content("done");
        assert_eq!(out.content(), "done");
        assert_eq!(out.scroll(), 0);
        assert_eq!(out.refresh_count(), 2);
    }
}
