//! Query-string dispatch for URL-based code loading.

use tracing::debug;
use url::form_urlencoded;

use crate::compression::{decode_url_safe, decompress_from_base64};
use crate::error::LoadError;
use crate::loaders::CodeLoader;

/// The one code source a console URL selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeSource {
    /// URL-safe base64 of the source text.
    Code(String),
    /// Deflated, base64-encoded source text.
    Codez(String),
    Gist(String),
    Github(String),
    StackOverflow(String),
    None,
}

impl CodeSource {
    /// Parse a query string (leading `?` optional). Keys are tried in the order
    /// code, codez, gist, github, stackoverflow; for repeated keys the first value counts.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let params: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let first = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        };

        if let Some(v) = first("code") {
            CodeSource::Code(v)
        } else if let Some(v) = first("codez") {
            CodeSource::Codez(v)
        } else if let Some(v) = first("gist") {
            CodeSource::Gist(v)
        } else if let Some(v) = first("github") {
            CodeSource::Github(v)
        } else if let Some(v) = first("stackoverflow") {
            CodeSource::StackOverflow(v)
        } else {
            CodeSource::None
        }
    }

    /// Parse the query part of a full console URL.
    pub fn from_url(url: &url::Url) -> Self {
        Self::from_query(url.query().unwrap_or_default())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CodeSource::Code(_) => "code",
            CodeSource::Codez(_) => "codez",
            CodeSource::Gist(_) => "gist",
            CodeSource::Github(_) => "github",
            CodeSource::StackOverflow(_) => "stackoverflow",
            CodeSource::None => "none",
        }
    }

    /// Turn the source into code text. `None` resolves to an empty string.
    pub async fn resolve<L>(&self, loader: &L) -> Result<String, LoadError>
    where
        L: CodeLoader + ?Sized,
    {
        debug!(source = self.kind(), "resolving code source");
        match self {
            CodeSource::Code(value) => decode_url_safe(value),
            CodeSource::Codez(value) => decompress_from_base64(value),
            CodeSource::Gist(id) => loader.load_gist(id).await,
            CodeSource::Github(path) => loader.load_github_file(path).await,
            CodeSource::StackOverflow(id) => loader.load_code_from_question(id).await,
            CodeSource::None => Ok(String::new()),
        }
    }
}
