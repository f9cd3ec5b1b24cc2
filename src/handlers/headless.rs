//! Headless modes: print, run, AST and share without the terminal UI.

use anyhow::{Context, Result};
use is_terminal::IsTerminal;

use gconsole::config::Config;
use gconsole::editor::CodeEditor;
use gconsole::executor::ExecutorClient;
use gconsole::share::share_url;

use crate::printer::TextPrinter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Print,
    Run,
    Ast(String),
    Share,
}

/// Returns whether the script succeeded, so `main` can set the exit status.
pub async fn run(cfg: &Config, mode: Mode, editor: &mut CodeEditor) -> Result<bool> {
    let printer = TextPrinter { color: std::io::stdout().is_terminal() };
    let code = editor.get_code();

    match &mode {
        Mode::Print => {
            print!("{code}");
            if !code.is_empty() && !code.ends_with('\n') {
                println!();
            }
            Ok(true)
        }
        Mode::Share => {
            println!("{}", share_url(&cfg.console_base_url(), &code)?);
            Ok(true)
        }
        Mode::Run | Mode::Ast(_) => {
            let client = ExecutorClient::from_config(cfg)?;
            let result = match &mode {
                Mode::Ast(phase) => client.transpile(&code, phase).await,
                _ => client.execute(&code).await,
            }
            .with_context(|| format!("executor at {} failed", client.url()))?;

            if result.has_error() {
                editor.handle_error_result(&result.err);
            }
            let error_at = editor.lint_markers().first().map(|a| a.from);
            printer.print_result(&result, error_at);
            Ok(!result.has_error())
        }
    }
}
