//! Remote code sources: Gist, GitHub files and Stack Overflow questions.

use futures::future::BoxFuture;
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;

use crate::config::{
    Config, DEFAULT_GITHUB_API_BASE, DEFAULT_GITHUB_RAW_BASE, DEFAULT_STACKEXCHANGE_API_BASE,
};
use crate::error::LoadError;

pub mod github;
pub mod stackoverflow;

/// Remote lookups the URL-loading pipeline dispatches to.
pub trait CodeLoader: Send + Sync {
    fn load_gist<'a>(&'a self, gist_id: &'a str) -> BoxFuture<'a, Result<String, LoadError>>;

    fn load_github_file<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String, LoadError>>;

    fn load_code_from_question<'a>(
        &'a self,
        question_id: &'a str,
    ) -> BoxFuture<'a, Result<String, LoadError>>;
}

#[derive(Debug, Clone)]
pub struct SourceClient {
    http: Client,
    github_api: String,
    github_raw: String,
    stackexchange_api: String,
    github_token: Option<String>,
}

impl SourceClient {
    pub fn from_config(cfg: &Config) -> Result<Self, LoadError> {
        let http = Client::builder()
            .timeout(cfg.request_timeout())
            .user_agent(concat!("gconsole/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            github_api: base(cfg, "GITHUB_API_BASE", DEFAULT_GITHUB_API_BASE),
            github_raw: base(cfg, "GITHUB_RAW_BASE", DEFAULT_GITHUB_RAW_BASE),
            stackexchange_api: base(cfg, "STACKEXCHANGE_API_BASE", DEFAULT_STACKEXCHANGE_API_BASE),
            github_token: cfg.get("GITHUB_TOKEN").filter(|t| !t.trim().is_empty()),
        })
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Response, LoadError> {
        debug!(url, "fetching code source");
        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(LoadError::Status { url: url.to_string(), status });
        }
        Ok(resp)
    }

    fn github_api_request(&self, url: &str) -> RequestBuilder {
        let request = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        match &self.github_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

impl CodeLoader for SourceClient {
    fn load_gist<'a>(&'a self, gist_id: &'a str) -> BoxFuture<'a, Result<String, LoadError>> {
        Box::pin(self.fetch_gist(gist_id))
    }

    fn load_github_file<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String, LoadError>> {
        Box::pin(self.fetch_github_file(path))
    }

    fn load_code_from_question<'a>(
        &'a self,
        question_id: &'a str,
    ) -> BoxFuture<'a, Result<String, LoadError>> {
        Box::pin(self.fetch_question_code(question_id))
    }
}

fn base(cfg: &Config, key: &str, default: &str) -> String {
    cfg.get(key)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}
