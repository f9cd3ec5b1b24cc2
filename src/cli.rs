use std::path::PathBuf;

use clap::{ArgGroup, Parser};

#[derive(Parser, Debug, Clone)]
#[command(name = "gconsole", about = "Terminal client for the Groovy web console", version)]
#[command(group(ArgGroup::new("source").args(["query", "url"]).multiple(false)))]
#[command(group(ArgGroup::new("headless").args(["print", "run", "ast", "share"]).multiple(false)))]
pub struct Cli {
    /// Groovy script to open. Ctrl+S saves back to it.
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Console query string selecting the code, e.g. `gist=user/abc123`.
    #[arg(long, short = 'q')]
    pub query: Option<String>,

    /// Full console URL; its query string selects the code.
    #[arg(long, short = 'u')]
    pub url: Option<String>,

    /// Execute the code and print the result instead of opening the editor.
    #[arg(long, short = 'r')]
    pub run: bool,

    /// Print the AST of the code at the given compile phase.
    #[arg(long, value_name = "PHASE")]
    pub ast: Option<String>,

    /// Print the loaded code and exit.
    #[arg(long, short = 'p')]
    pub print: bool,

    /// Print a share link for the code and exit.
    #[arg(long, short = 's')]
    pub share: bool,

    /// Executor endpoint, overrides EXECUTOR_URL.
    #[arg(long, value_name = "URL")]
    pub executor: Option<String>,

    /// Never start the terminal UI; print the loaded code when no other mode is given.
    #[arg(long = "no-tui")]
    pub no_tui: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Whether any headless mode was requested.
    pub fn is_headless(&self) -> bool {
        self.no_tui || self.print || self.run || self.ast.is_some() || self.share
    }
}
