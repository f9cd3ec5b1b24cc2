//! Async event handler for the console TUI.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEventKind, KeyModifiers,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::Config;
use crate::editor::CodeSource;
use crate::executor::ExecutorClient;
use crate::loaders::SourceClient;
use super::{
    app::{App, Focus},
    events::TuiEvent,
    ui::render_ui,
};

/// What the editor starts with.
#[derive(Debug, Clone, Default)]
pub struct Startup {
    /// Console query string to load code from
    pub query: Option<String>,
    /// Code read from a file or stdin
    pub initial_code: Option<String>,
    /// File Ctrl+S saves to
    pub file_path: Option<PathBuf>,
}

/// Run the console TUI
pub async fn run_tui(cfg: &Config, startup: Startup) -> Result<()> {
    // Check if we're in a proper terminal environment
    if !io::IsTerminal::is_terminal(&io::stdout()) {
        return Err(anyhow::anyhow!("TUI mode requires a proper terminal environment"));
    }

    let loader = SourceClient::from_config(cfg)?;
    let executor = ExecutorClient::from_config(cfg)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(cfg.console_base_url(), executor.url().to_string(), startup.file_path.clone());
    if let Some(code) = startup.initial_code.as_deref() {
        app.code.set_code(code);
    }
    app.code.buffer_mut().focus();

    let result = async {
        if let Some(query) = startup.query.as_deref() {
            load_startup_code(&mut terminal, &mut app, query, &loader).await?;
        }
        run_app(&mut terminal, &mut app, executor).await
    }
    .await;

    // Restore terminal
    disable_raw_mode()?;
    terminal.backend_mut().execute(DisableBracketedPaste)?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Runs the URL-loading pipeline once, before the event loop starts.
async fn load_startup_code(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    query: &str,
    loader: &SourceClient,
) -> Result<()> {
    let source = CodeSource::from_query(query);
    if source == CodeSource::None {
        return Ok(());
    }

    app.set_status(format!("Loading code from {}...", source.kind()));
    terminal.draw(|frame| render_ui(frame, app))?;

    match app.code.load_from_url(query, loader).await {
        Ok(code) if code.is_empty() => app.set_status(format!("{} source was empty", source.kind())),
        Ok(code) => {
            info!(source = source.kind(), lines = code.lines().count(), "loaded code from url");
            app.set_status(format!("Loaded {} lines from {}", code.lines().count(), source.kind()));
        }
        Err(e) => app.set_status(format!("Failed to load code from {}: {}", source.kind(), e)),
    }
    Ok(())
}

/// Main application loop
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    executor: ExecutorClient,
) -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<TuiEvent>();

    // Spawn input handler
    let input_tx = event_tx.clone();
    tokio::task::spawn_blocking(move || {
        forward_input(
            || event::poll(Duration::from_millis(100)),
            event::read,
            &input_tx,
        )
    });

    loop {
        // Render UI
        terminal.draw(|frame| render_ui(frame, app))?;

        // Handle events
        if let Ok(tui_event) = event_rx.try_recv() {
            match tui_event {
                TuiEvent::Key(key) => {
                    if handle_key_event(app, key, &event_tx)? {
                        break; // Quit requested
                    }
                }
                TuiEvent::Paste(text) => {
                    if app.focus == Focus::Code && !app.is_popup_shown() {
                        app.code.insert_str(&text);
                    }
                }
                TuiEvent::Run { ast } => {
                    if app.start_run(ast) {
                        let code = app.code.get_code();
                        let phase = app.ast_phase.clone();
                        let client = executor.clone();
                        let tx = event_tx.clone();
                        tokio::spawn(async move {
                            let outcome = if ast {
                                client.transpile(&code, &phase).await
                            } else {
                                client.execute(&code).await
                            };
                            let event = match outcome {
                                Ok(result) => TuiEvent::ExecutionFinished(result),
                                Err(e) => {
                                    warn!(error = %e, "script execution request failed");
                                    TuiEvent::ExecutionFailed(e.to_string())
                                }
                            };
                            let _ = tx.send(event);
                        });
                    }
                }
                TuiEvent::ExecutionFinished(result) => app.finish_run(result),
                TuiEvent::ExecutionFailed(error) => app.fail_run(error),
                TuiEvent::Quit => break,
            }
        }

        // Small delay to prevent busy waiting
        tokio::time::sleep(Duration::from_millis(16)).await; // ~60 FPS
    }

    Ok(())
}

/// Forwards terminal input to the UI loop until the channel closes. A failing
/// terminal ends the session instead of spinning on the error.
fn forward_input(
    mut poll: impl FnMut() -> io::Result<bool>,
    mut read: impl FnMut() -> io::Result<Event>,
    input_tx: &mpsc::UnboundedSender<TuiEvent>,
) {
    loop {
        let ready = match poll() {
            Ok(ready) => ready,
            Err(e) => {
                warn!(error = %e, "terminal input failed, quitting");
                let _ = input_tx.send(TuiEvent::Quit);
                break;
            }
        };
        if ready {
            let sent = match read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => input_tx.send(TuiEvent::Key(key)),
                Ok(Event::Paste(text)) => input_tx.send(TuiEvent::Paste(text)),
                _ => Ok(()),
            };
            if sent.is_err() {
                break; // Channel closed
            }
        } else if input_tx.is_closed() {
            break;
        }
    }
}

/// Handle keyboard events. Returns true when the app should quit.
fn handle_key_event(
    app: &mut App,
    key: crossterm::event::KeyEvent,
    event_tx: &mpsc::UnboundedSender<TuiEvent>,
) -> Result<bool> {
    // If any popup is shown, any key closes it
    if app.is_popup_shown() {
        app.hide_popup();
        return Ok(false);
    }
    if app.show_help && key.code != KeyCode::F(1) {
        app.toggle_help();
        return Ok(false);
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => return Ok(app.handle_ctrl_c()),
        KeyCode::Char('q') if ctrl => {
            let _ = event_tx.send(TuiEvent::Quit);
        }
        KeyCode::Char('r') if ctrl => {
            let _ = event_tx.send(TuiEvent::Run { ast: false });
        }
        KeyCode::F(5) => {
            let _ = event_tx.send(TuiEvent::Run { ast: false });
        }
        KeyCode::F(6) => {
            let _ = event_tx.send(TuiEvent::Run { ast: true });
        }
        KeyCode::F(1) => app.toggle_help(),
        KeyCode::F(2) => app.toggle_focus(),
        KeyCode::Char('l') if ctrl => app.clear_errors(),
        KeyCode::Char('s') if ctrl => {
            if let Err(e) = app.save() {
                app.set_status(format!("Save failed: {e}"));
            }
        }
        KeyCode::Char('u') if ctrl => {
            if let Err(e) = app.show_share_link() {
                app.set_status(format!("Share failed: {e}"));
            }
        }
        _ if app.focus == Focus::Output => match key.code {
            KeyCode::Up => app.output.scroll_up(),
            KeyCode::Down => app.output.scroll_down(),
            KeyCode::Esc => app.toggle_focus(),
            _ => {}
        },
        KeyCode::Enter => app.code.insert_newline(),
        KeyCode::Tab => app.code.insert_tab(),
        KeyCode::Backspace => app.code.backspace(),
        KeyCode::Delete => app.code.delete(),
        KeyCode::Left => app.code.buffer_mut().move_left(),
        KeyCode::Right => app.code.buffer_mut().move_right(),
        KeyCode::Up => app.code.buffer_mut().move_up(),
        KeyCode::Down => app.code.buffer_mut().move_down(),
        KeyCode::Home => app.code.buffer_mut().move_home(),
        KeyCode::End => app.code.buffer_mut().move_end(),
        KeyCode::Char(c) if !ctrl => app.code.insert_char(c),
        _ => {}
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn typing_edits_the_code() {
        let mut app = App::new(String::new(), String::new(), None);
        let (tx, _rx) = mpsc::unbounded_channel();
        for c in "x = 1".chars() {
            handle_key_event(&mut app, key(KeyCode::Char(c)), &tx).unwrap();
        }
        handle_key_event(&mut app, key(KeyCode::Enter), &tx).unwrap();
        assert_eq!(app.code.get_code(), "x = 1\n");
    }

    #[test]
    fn run_keys_queue_a_run() {
        let mut app = App::new(String::new(), String::new(), None);
        let (tx, mut rx) = mpsc::unbounded_channel();
        handle_key_event(&mut app, key(KeyCode::F(5)), &tx).unwrap();
        handle_key_event(&mut app, key(KeyCode::F(6)), &tx).unwrap();
        assert!(matches!(rx.try_recv(), Ok(TuiEvent::Run { ast: false })));
        assert!(matches!(rx.try_recv(), Ok(TuiEvent::Run { ast: true })));
    }

    #[test]
    fn ctrl_l_clears_annotations() {
        let mut app = App::new(String::new(), String::new(), None);
        let (tx, _rx) = mpsc::unbounded_channel();
        app.code.handle_error_result("bad @ line 1, column 1.");
        handle_key_event(&mut app, ctrl('l'), &tx).unwrap();
        assert!(app.code.lint_markers().is_empty());
    }

    #[test]
    fn output_focus_does_not_edit() {
        let mut app = App::new(String::new(), String::new(), None);
        let (tx, _rx) = mpsc::unbounded_channel();
        handle_key_event(&mut app, key(KeyCode::F(2)), &tx).unwrap();
        handle_key_event(&mut app, key(KeyCode::Char('z')), &tx).unwrap();
        assert_eq!(app.code.get_code(), "");
        assert_eq!(app.focus, Focus::Output);
    }

    #[test]
    fn any_key_closes_popup() {
        let mut app = App::new("https://console.example/".into(), String::new(), None);
        let (tx, _rx) = mpsc::unbounded_channel();
        handle_key_event(&mut app, ctrl('u'), &tx).unwrap();
        assert!(app.is_popup_shown());
        handle_key_event(&mut app, key(KeyCode::Char('a')), &tx).unwrap();
        assert!(!app.is_popup_shown());
        assert_eq!(app.code.get_code(), "");
    }

    #[test]
    fn poll_error_ends_input_with_quit() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut polls = 0;
        forward_input(
            || {
                polls += 1;
                Err(io::Error::new(io::ErrorKind::Other, "tty gone"))
            },
            || unreachable!("nothing to read"),
            &tx,
        );
        assert_eq!(polls, 1);
        assert!(matches!(rx.try_recv(), Ok(TuiEvent::Quit)));
    }

    #[test]
    fn input_stops_when_receiver_is_gone() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        forward_input(|| Ok(true), || Ok(Event::Paste("x".into())), &tx);
    }
}
