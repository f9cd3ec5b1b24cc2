//! Groovy syntax highlighting using syntect's bundled grammars.

use std::sync::OnceLock;

use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};

/// A highlighted piece of one line.
pub type StyledSpan = (Style, String);

/// Syntax set and theme, loaded once per process.
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl Highlighter {
    pub fn new() -> Self {
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let mut themes = ThemeSet::load_defaults().themes;
        // base16-ocean.dark reads well on dark terminals
        let theme = themes
            .remove("base16-ocean.dark")
            .or_else(|| themes.into_values().next())
            .unwrap_or_default();
        Self { syntax_set, theme }
    }

    /// Shared instance; building the syntax set is expensive.
    pub fn global() -> &'static Highlighter {
        static HIGHLIGHTER: OnceLock<Highlighter> = OnceLock::new();
        HIGHLIGHTER.get_or_init(Highlighter::new)
    }

    fn groovy(&self) -> &SyntaxReference {
        self.syntax_set
            .find_syntax_by_extension("groovy")
            .or_else(|| self.syntax_set.find_syntax_by_token("groovy"))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
    }

    pub fn is_groovy_supported(&self) -> bool {
        self.syntax_set.find_syntax_by_extension("groovy").is_some()
    }

    /// Highlight `lines[..end]`. Parse state runs from the first line, so
    /// multi-line comments and strings are right inside any window.
    pub fn highlight_lines(&self, lines: &[String], end: usize) -> Vec<Vec<StyledSpan>> {
        let mut highlighter = HighlightLines::new(self.groovy(), &self.theme);
        lines
            .iter()
            .take(end)
            .map(|line| {
                let with_newline = format!("{line}\n");
                match highlighter.highlight_line(&with_newline, &self.syntax_set) {
                    Ok(ranges) => ranges
                        .into_iter()
                        .filter_map(|(style, text)| {
                            let text = text.trim_end_matches('\n');
                            (!text.is_empty()).then(|| (style, text.to_string()))
                        })
                        .collect(),
                    Err(_) => vec![(Style::default(), line.clone())],
                }
            })
            .collect()
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

/// Highlighted lines of the last buffer drawn; recomputed only when the text changes.
#[derive(Debug, Default)]
pub struct HighlightCache {
    source: Vec<String>,
    styled: Vec<Vec<StyledSpan>>,
}

impl HighlightCache {
    /// Styled spans for `lines[..end]`.
    pub fn lines(&mut self, highlighter: &Highlighter, lines: &[String], end: usize) -> &[Vec<StyledSpan>] {
        let end = end.min(lines.len());
        if self.source != lines || self.styled.len() < end {
            self.styled = highlighter.highlight_lines(lines, end);
            self.source = lines.to_vec();
        }
        &self.styled[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.split('\n').map(str::to_string).collect()
    }

    fn style_of(spans: &[StyledSpan], needle: &str) -> Style {
        spans
            .iter()
            .find(|(_, text)| text.contains(needle))
            .map(|(style, _)| *style)
            .unwrap_or_else(|| panic!("{needle:?} not in {spans:?}"))
    }

    #[test]
    fn groovy_grammar_is_bundled() {
        assert!(Highlighter::global().is_groovy_supported());
    }

    #[test]
    fn spans_cover_the_whole_line() {
        let source = lines("def s = \"a ${m[\"k\"]} b\" // c\ndef re = /it's \\d+/");
        let styled = Highlighter::global().highlight_lines(&source, source.len());
        for (line, spans) in source.iter().zip(&styled) {
            let joined: String = spans.iter().map(|(_, t)| t.as_str()).collect();
            assert_eq!(&joined, line);
        }
    }

    #[test]
    fn keywords_and_comments_differ_from_names() {
        let source = lines("def total = 1 // running sum");
        let styled = Highlighter::global().highlight_lines(&source, 1);
        let keyword = style_of(&styled[0], "def");
        let comment = style_of(&styled[0], "running sum");
        assert_ne!(keyword.foreground, comment.foreground);
    }

    #[test]
    fn block_comment_carries_into_next_line() {
        let source = lines("/* opened here\nstill inside */\ndef x = 1");
        let styled = Highlighter::global().highlight_lines(&source, 3);
        let first = style_of(&styled[0], "opened");
        let second = style_of(&styled[1], "still");
        assert_eq!(first.foreground, second.foreground);
        assert_ne!(style_of(&styled[2], "def").foreground, second.foreground);
    }

    #[test]
    fn cache_follows_edits() {
        let highlighter = Highlighter::global();
        let mut cache = HighlightCache::default();
        let before = lines("println 1\nprintln 2");
        assert_eq!(cache.lines(highlighter, &before, 5).len(), 2);

        let after = lines("println 1\nprintln 22\nprintln 3");
        let styled = cache.lines(highlighter, &after, 3);
        let joined: String = styled[1].iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(joined, "println 22");
        assert_eq!(styled.len(), 3);
    }
}
