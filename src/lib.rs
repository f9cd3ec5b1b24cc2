//! Terminal client for the Groovy web console: a code editor session with
//! lint annotations, URL-driven code loading, and the remote executor.

pub mod compression;
pub mod config;
pub mod editor;
pub mod error;
pub mod executor;
pub mod loaders;
pub mod share;
pub mod tui;
pub mod utils;

pub use error::{ExecuteError, LoadError};
