//! UI layout and rendering logic for the TUI.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::app::{App, Focus, PopupState};
use crate::editor::buffer::char_to_byte_index;
use crate::editor::highlight::Highlighter;

/// Render the main UI
pub fn render_ui(frame: &mut Frame, app: &mut App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(60), // Code area
            Constraint::Min(3),         // Output area
            Constraint::Length(1),      // Status bar
        ])
        .split(frame.area());

    render_code_area(frame, app, main_layout[0]);
    render_output_area(frame, app, main_layout[1]);
    render_status_bar(frame, app, main_layout[2]);

    // Render help overlay if requested
    if app.show_help {
        render_help_overlay(frame);
    }

    // Render popup if requested
    match &app.popup_state {
        PopupState::ShareLink { url } => render_share_popup(frame, url),
        PopupState::None => {}
    }
}

/// Map a syntect style onto the terminal; background stays the terminal's own.
fn token_style(style: &syntect::highlighting::Style) -> Style {
    use syntect::highlighting::FontStyle;

    let fg = style.foreground;
    let mut out = Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b));
    if style.font_style.contains(FontStyle::BOLD) {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        out = out.add_modifier(Modifier::UNDERLINED);
    }
    out
}

/// Render the code editor with line numbers, lint gutter and highlighting
fn render_code_area(frame: &mut Frame, app: &mut App, area: Rect) {
    let available_height = area.height.saturating_sub(2) as usize; // Account for borders
    app.code.buffer_mut().scroll_to_cursor(available_height);

    let buffer = app.code.buffer();
    let markers = app.code.lint_markers();
    let number_width = buffer.line_count().to_string().len().max(2);
    let error_style = Style::default().fg(Color::Red).add_modifier(Modifier::BOLD);

    let window_end = buffer.scroll + available_height;
    let styled = app.highlights.lines(Highlighter::global(), buffer.lines(), window_end);
    let mut content_lines = Vec::new();
    for (idx, spans_for_line) in styled.iter().enumerate().skip(buffer.scroll) {
        let has_error = markers.iter().any(|a| a.covers_line(idx));
        let mut spans = vec![
            Span::styled(
                format!("{:>width$} ", idx + 1, width = number_width),
                Style::default().fg(Color::DarkGray),
            ),
            if has_error {
                Span::styled("● ", error_style)
            } else {
                Span::raw("  ")
            },
        ];
        spans.extend(spans_for_line.iter().map(|(style, text)| {
            let style = if has_error { token_style(style).add_modifier(Modifier::UNDERLINED) } else { token_style(style) };
            Span::styled(text.clone(), style)
        }));
        content_lines.push(Line::from(spans));
    }

    let title = match &app.file_path {
        Some(path) => format!("Groovy - {}", path.display()),
        None => "Groovy".to_string(),
    };
    let border_style = if app.focus == Focus::Code {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let paragraph = Paragraph::new(Text::from(content_lines))
        .block(Block::default().borders(Borders::ALL).border_style(border_style).title(title));
    frame.render_widget(paragraph, area);

    if app.focus == Focus::Code && !app.show_help && !app.is_popup_shown() {
        let cursor = buffer.cursor();
        let line = buffer.line(cursor.line).unwrap_or_default();
        let col = line[..char_to_byte_index(line, cursor.ch)].width();
        let gutter = number_width + 3;
        let offset_x = u16::try_from(1 + gutter + col).ok();
        let offset_y = u16::try_from(1 + cursor.line.saturating_sub(buffer.scroll)).ok();
        if let (Some(dx), Some(dy)) = (offset_x, offset_y) {
            let x = area.x.saturating_add(dx);
            let y = area.y.saturating_add(dy);
            if x < area.right().saturating_sub(1) && y < area.bottom().saturating_sub(1) {
                frame.set_cursor_position((x, y));
            }
        }
    }
}

/// Render the read-only output pane
fn render_output_area(frame: &mut Frame, app: &App, area: Rect) {
    let title = if app.is_running {
        format!("Output (running on {})", app.executor_url)
    } else {
        "Output".to_string()
    };
    let border_style = if app.focus == Focus::Output {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let paragraph = Paragraph::new(app.output.content())
        .block(Block::default().borders(Borders::ALL).border_style(border_style).title(title))
        .wrap(Wrap { trim: false })
        .scroll((app.output.scroll() as u16, 0));

    frame.render_widget(paragraph, area);
}

/// Render the status bar; the lint message under the cursor takes precedence
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let cursor = app.code.cursor();
    let markers = app.code.lint_markers();
    let marker = markers
        .iter()
        .find(|a| a.covers_line(cursor.line))
        .or_else(|| markers.first());

    let status_paragraph = match marker {
        Some(a) => {
            let first_line = a.message.lines().next().unwrap_or_default();
            Paragraph::new(format!("line {}: {}", a.from.line + 1, first_line))
                .style(Style::default().bg(Color::Red).fg(Color::White))
        }
        None => Paragraph::new(format!(
            "{} | Ln {}, Col {}",
            app.status_message,
            cursor.line + 1,
            cursor.ch + 1
        ))
        .style(Style::default().bg(Color::DarkGray).fg(Color::White)),
    };

    frame.render_widget(status_paragraph, area);
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame) {
    let area = frame.area();

    // Create centered popup area
    let popup_area = centered_rect(70, 70, area);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let help_lines = vec![
        Line::from("Groovy Console Help"),
        Line::from(""),
        Line::from("Run:"),
        Line::from("  F5 / Ctrl+R - Execute the script"),
        Line::from("  F6          - Show the AST of the script"),
        Line::from("  Ctrl+L      - Clear error markers"),
        Line::from(""),
        Line::from("Files:"),
        Line::from("  Ctrl+S      - Save to the file given on the command line"),
        Line::from("  Ctrl+U      - Show a share link"),
        Line::from(""),
        Line::from("Navigation:"),
        Line::from("  F2          - Switch between code and output"),
        Line::from("  ↑/↓         - Move cursor / scroll output"),
        Line::from("  Ctrl+C x2   - Quit (or Ctrl+Q)"),
        Line::from("  F1          - Toggle this help"),
    ];

    let help_paragraph = Paragraph::new(Text::from(help_lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .title_style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(help_paragraph, popup_area);
}

/// Helper function to create a centered rectangle
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Render share link popup
fn render_share_popup(frame: &mut Frame, url: &str) {
    let popup_area = centered_rect(85, 40, frame.area());
    frame.render_widget(Clear, popup_area);

    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Link
            Constraint::Length(2), // Instructions
        ])
        .split(popup_area);

    let link_paragraph = Paragraph::new(url)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Share Link")
                .title_style(
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(link_paragraph, popup_layout[0]);

    let instructions = Paragraph::new("Press any key to close")
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(instructions, popup_layout[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::Position;
    use ratatui::{
        backend::{Backend, TestBackend},
        Terminal,
    };

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal.draw(|frame| render_ui(frame, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn draws_code_with_line_numbers() {
        let mut app = App::new(String::new(), String::new(), None);
        app.code.set_code("def a = 1\nprintln a");
        let text = screen(&mut app);
        assert!(text.contains(" 1   def a = 1"), "{text}");
        assert!(text.contains(" 2   println a"), "{text}");
    }

    #[test]
    fn error_marker_and_message_are_shown() {
        let mut app = App::new(String::new(), String::new(), None);
        app.code.set_code("def a = 1\nfoo(");
        app.code.add_error_hint(Position::new(1, 3), Some("unexpected end"));
        let text = screen(&mut app);
        assert!(text.contains(" 2 ● foo("), "{text}");
        assert!(text.contains("line 2: unexpected end"), "{text}");
    }

    #[test]
    fn cursor_past_u16_range_is_not_placed() {
        let mut app = App::new(String::new(), String::new(), None);
        app.code.set_code(&"x".repeat(65_536));
        app.code.buffer_mut().set_cursor(Position::new(0, 65_536));

        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal.draw(|frame| render_ui(frame, &mut app)).unwrap();

        // 1 + gutter + column wraps to 6 when truncated to u16
        let placed = terminal.backend_mut().get_cursor_position().unwrap();
        assert_ne!(placed, ratatui::layout::Position::new(6, 1));
    }
}
