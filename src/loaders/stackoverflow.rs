//! Stack Overflow question loading through the Stack Exchange API.

use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::debug;

use super::SourceClient;
use crate::error::LoadError;

#[derive(Debug, Deserialize)]
struct QuestionsResponse {
    #[serde(default)]
    items: Vec<Question>,
}

#[derive(Debug, Deserialize)]
struct Question {
    #[serde(default)]
    body: Option<String>,
}

impl SourceClient {
    /// First code block of the question body.
    pub async fn fetch_question_code(&self, question: &str) -> Result<String, LoadError> {
        let id = question_id(question)?;
        let url = format!("{}/questions/{}", self.stackexchange_api, id);
        let request = self
            .http
            .get(&url)
            .query(&[("site", "stackoverflow"), ("filter", "withbody")]);
        let resp: QuestionsResponse = self.send(request, &url).await?.json().await?;

        let body = resp
            .items
            .into_iter()
            .next()
            .and_then(|q| q.body)
            .ok_or_else(|| LoadError::Extract(format!("question {id} not found")))?;
        debug!(question = id, body_len = body.len(), "loaded question");

        extract_first_code_block(&body)
            .ok_or_else(|| LoadError::Extract(format!("question {id} has no code block")))
    }
}

/// Accepts a numeric id or a `.../questions/<id>/<slug>` URL.
fn question_id(question: &str) -> Result<&str, LoadError> {
    let trimmed = question.trim();
    let id = match trimmed.split_once("/questions/") {
        Some((_, rest)) => rest.split('/').next().unwrap_or_default(),
        None => trimmed,
    };
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(LoadError::InvalidSource(format!("stackoverflow question {question:?}")));
    }
    Ok(id)
}

/// Text content of the first `pre code` element: entities decoded, nested markup dropped.
pub fn extract_first_code_block(html: &str) -> Option<String> {
    let document = Html::parse_fragment(html);
    let selector = Selector::parse("pre code").ok()?;
    document
        .select(&selector)
        .next()
        .map(|code| code.text().collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_code_block_wins() {
        let html = "<p>Why does this fail?</p>\n<pre class=\"lang-groovy s-code-block\"><code>def a = [1, 2]\nassert a.size() &lt; 3 &amp;&amp; a[0] == 1\n</code></pre>\n<p>and</p><pre><code>second()</code></pre>";
        assert_eq!(
            extract_first_code_block(html).unwrap(),
            "def a = [1, 2]\nassert a.size() < 3 && a[0] == 1\n"
        );
    }

    #[test]
    fn inline_code_is_not_a_block() {
        assert_eq!(extract_first_code_block("<p>use <code>println</code></p>"), None);
    }

    #[test]
    fn numeric_entities_are_decoded() {
        let html = "<pre><code>&#39;x&#39; &#x3D;&#x3e; &quot;y&quot;</code></pre>";
        assert_eq!(extract_first_code_block(html).unwrap(), "'x' => \"y\"");
    }

    #[test]
    fn named_entities_are_decoded() {
        let html = "<pre><code>println &quot;a&hellip;&rsquo;&ndash;&copy;&quot;</code></pre>";
        assert_eq!(extract_first_code_block(html).unwrap(), "println \"a\u{2026}\u{2019}\u{2013}\u{a9}\"");
    }

    #[test]
    fn nested_markup_is_dropped() {
        let html = "<pre class=\"lang-groovy\"><code>def x = <b>1</b>\n<span class=\"hljs\">println</span> x</code></pre>";
        assert_eq!(extract_first_code_block(html).unwrap(), "def x = 1\nprintln x");
    }

    #[test]
    fn stray_ampersand_is_kept() {
        assert_eq!(extract_first_code_block("<pre><code>a & b</code></pre>").unwrap(), "a & b");
    }

    #[test]
    fn question_id_from_url() {
        assert_eq!(question_id("https://stackoverflow.com/questions/1234/some-title").unwrap(), "1234");
        assert_eq!(question_id(" 5678 ").unwrap(), "5678");
        assert!(question_id("abc").is_err());
    }
}
