mod cli;
mod handlers;
mod printer;

use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use is_terminal::IsTerminal;
use tracing_subscriber::EnvFilter;
use url::Url;

use gconsole::config::Config;
use gconsole::editor::{CodeEditor, CodeSource};
use gconsole::loaders::SourceClient;
use gconsole::tui::{run_tui, Startup};
use gconsole::utils::read_script;

use handlers::headless::{self, Mode};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // Load config; the command line wins over rc file and environment
    let mut cfg = Config::load();
    if let Some(executor) = args.executor.as_deref() {
        cfg.set("EXECUTOR_URL", executor);
    }

    let stdout_is_tty = io::stdout().is_terminal();
    let stdin_is_tty = io::stdin().is_terminal();
    let tui = !args.is_headless() && stdout_is_tty && stdin_is_tty;
    init_logging(&cfg, tui)?;

    // Query string from --query or the query part of --url
    let query = match (args.query.as_deref(), args.url.as_deref()) {
        (Some(q), _) => Some(q.to_string()),
        (None, Some(u)) => {
            let url = Url::parse(u).with_context(|| format!("invalid console url: {u}"))?;
            Some(url.query().unwrap_or_default().to_string())
        }
        (None, None) => None,
    };

    let initial_code = match args.file.as_deref() {
        Some(path) if path.exists() => Some(read_script(path)?),
        Some(_) if tui => None, // new file, created on save
        Some(path) => bail!("Script file '{}' does not exist", path.display()),
        None if !stdin_is_tty => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Some(buf)
        }
        None => None,
    };

    if tui {
        let startup = Startup { query, initial_code, file_path: args.file.clone() };
        return run_tui(&cfg, startup).await;
    }

    // Headless: same precedence, query first, then file or stdin
    let mut editor = CodeEditor::new();
    if let Some(code) = initial_code.as_deref() {
        editor.set_code(code);
    }
    if let Some(q) = query.as_deref() {
        if CodeSource::from_query(q) == CodeSource::None {
            bail!("no code source in query '{q}' (expected code, codez, gist, github or stackoverflow)");
        }
        let loader = SourceClient::from_config(&cfg)?;
        editor.load_from_url(q, &loader).await.context("failed to load code")?;
    }

    let mode = if args.run {
        Mode::Run
    } else if let Some(phase) = args.ast.clone() {
        Mode::Ast(phase)
    } else if args.share {
        Mode::Share
    } else {
        Mode::Print
    };

    if !headless::run(&cfg, mode, &mut editor).await? {
        std::process::exit(1);
    }
    Ok(())
}

/// RUST_LOG filtering, defaulting to `warn`. The TUI owns the screen, so its logs go to a file.
fn init_logging(cfg: &Config, tui: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if tui {
        let path = cfg.log_file();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
        }
        let file = open_log(&path)?;
        let _ = builder.with_ansi(false).with_writer(Mutex::new(file)).try_init();
    } else {
        let _ = builder.with_writer(io::stderr).try_init();
    }
    Ok(())
}

fn open_log(path: &Path) -> Result<fs::File> {
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}
