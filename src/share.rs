//! Shareable console links.

use anyhow::{Context, Result};
use url::Url;

use crate::compression::compress_to_base64;

/// `base` with its query replaced by `codez=<compressed code>`.
pub fn share_url(base: &str, code: &str) -> Result<String> {
    let mut url = Url::parse(base).with_context(|| format!("invalid console url: {base}"))?;
    let blob = compress_to_base64(code).context("failed to compress code")?;
    url.set_query(None);
    url.query_pairs_mut().append_pair("codez", &blob);
    Ok(url.to_string())
}
