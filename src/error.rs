//! Error types shared by the decoders, loaders and executor client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    /// Input was not valid (URL-safe) base64 or did not decode to UTF-8.
    #[error("failed to decode code parameter: {0}")]
    Decode(String),

    #[error("failed to decompress code: {0}")]
    Decompress(#[from] std::io::Error),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned {status}")]
    Status { url: String, status: reqwest::StatusCode },

    /// The payload was fetched but held nothing we can use as code.
    #[error("no code found: {0}")]
    Extract(String),

    #[error("invalid source identifier: {0}")]
    InvalidSource(String),
}

#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("executor request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("executor returned {status}: {body}")]
    Status { status: reqwest::StatusCode, body: String },
}
