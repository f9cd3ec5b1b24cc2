//! Gist and GitHub file loading.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::SourceClient;
use crate::error::LoadError;

#[derive(Debug, Deserialize)]
struct Gist {
    #[serde(default)]
    files: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct GistFile {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    truncated: bool,
    #[serde(default)]
    raw_url: Option<String>,
}

impl SourceClient {
    /// Content of the first file of a gist, in the order the API lists them.
    pub async fn fetch_gist(&self, gist_id: &str) -> Result<String, LoadError> {
        let id = gist_key(gist_id)?;
        let url = format!("{}/gists/{}", self.github_api, id);
        let gist: Gist = self.send(self.github_api_request(&url), &url).await?.json().await?;

        let (name, file) = gist
            .files
            .into_iter()
            .next()
            .ok_or_else(|| LoadError::Extract(format!("gist {id} has no files")))?;
        let file: GistFile = serde_json::from_value(file)
            .map_err(|e| LoadError::Extract(format!("gist file {name}: {e}")))?;
        debug!(gist = id, file = %name, truncated = file.truncated, "loaded gist");

        match (file.truncated, file.raw_url, file.content) {
            (true, Some(raw_url), _) => {
                let resp = self.send(self.http.get(&raw_url), &raw_url).await?;
                Ok(resp.text().await?)
            }
            (_, _, Some(content)) => Ok(content),
            _ => Err(LoadError::Extract(format!("gist file {name} has no content"))),
        }
    }

    /// Raw contents of a file in a GitHub repository.
    pub async fn fetch_github_file(&self, path: &str) -> Result<String, LoadError> {
        let url = raw_file_url(&self.github_raw, path)?;
        let resp = self.send(self.http.get(&url), &url).await?;
        Ok(resp.text().await?)
    }
}

/// Accepts a bare gist id or `user/id`.
fn gist_key(gist_id: &str) -> Result<&str, LoadError> {
    let id = gist_id.trim().trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(LoadError::InvalidSource(format!("gist id {gist_id:?}")));
    }
    Ok(id)
}

/// Maps `owner/repo/[blob/]ref/path`, a github.com blob URL or a raw URL onto
/// `{raw_base}/owner/repo/ref/path`.
pub fn raw_file_url(raw_base: &str, spec: &str) -> Result<String, LoadError> {
    let trimmed = spec.trim();
    let path = ["https://raw.githubusercontent.com/", "https://github.com/", "http://github.com/"]
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .unwrap_or(trimmed);

    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() > 4 && matches!(segments[2], "blob" | "raw") {
        segments.remove(2);
    }
    if segments.len() < 4 {
        return Err(LoadError::InvalidSource(format!(
            "github file {spec:?}, expected owner/repo/ref/path"
        )));
    }

    Ok(format!("{}/{}", raw_base.trim_end_matches('/'), segments.join("/")))
}
