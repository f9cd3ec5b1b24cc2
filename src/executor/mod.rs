//! Client for the remote Groovy executor: request and result types.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::ExecuteError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptRequest {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ast_phase: Option<String>,
}

impl ScriptRequest {
    pub fn execute(code: &str) -> Self {
        Self { code: code.to_string(), action: None, ast_phase: None }
    }

    pub fn ast(code: &str, phase: &str) -> Self {
        Self {
            code: code.to_string(),
            action: Some("ast".to_string()),
            ast_phase: Some(phase.to_ascii_uppercase()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStats {
    /// Milliseconds spent evaluating the script.
    #[serde(default)]
    pub execution_time: Option<u64>,
}

/// Executor response. Absent fields mean empty output / no result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecutionResult {
    #[serde(default)]
    pub out: String,
    #[serde(default)]
    pub err: String,
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub stats: ExecutionStats,
}

impl ExecutionResult {
    pub fn has_error(&self) -> bool {
        !self.err.is_empty()
    }

    /// Text for the output pane: printed output, then the result value, then the error.
    pub fn render_output(&self) -> String {
        let mut sections: Vec<String> = Vec::new();
        if !self.out.is_empty() {
            sections.push(self.out.trim_end_matches('\n').to_string());
        }
        match &self.result {
            Value::Null => {}
            Value::String(s) => sections.push(format!("Result: {s}")),
            other => sections.push(format!("Result: {other}")),
        }
        if self.has_error() {
            sections.push(self.err.trim_end_matches('\n').to_string());
        }
        sections.join("\n")
    }
}

#[derive(Debug, Clone)]
pub struct ExecutorClient {
    client: Client,
    url: String,
}

impl ExecutorClient {
    pub fn from_config(cfg: &Config) -> Result<Self, ExecuteError> {
        let client = Client::builder()
            .timeout(cfg.request_timeout())
            .user_agent(concat!("gconsole/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, url: cfg.executor_url() })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn execute(&self, code: &str) -> Result<ExecutionResult, ExecuteError> {
        self.send(&ScriptRequest::execute(code)).await
    }

    /// Render the AST of `code` at the given compile phase (e.g. `CONVERSION`).
    pub async fn transpile(&self, code: &str, phase: &str) -> Result<ExecutionResult, ExecuteError> {
        self.send(&ScriptRequest::ast(code, phase)).await
    }

    async fn send(&self, request: &ScriptRequest) -> Result<ExecutionResult, ExecuteError> {
        debug!(url = %self.url, action = ?request.action, "posting script");
        let resp = self.client.post(&self.url).json(request).send().await?;

        match resp.status() {
            status if status.is_success() => {
                let result: ExecutionResult = resp.json().await?;
                info!(
                    execution_time_ms = ?result.stats.execution_time,
                    failed = result.has_error(),
                    "script finished"
                );
                Ok(result)
            }
            status => {
                let body = resp.text().await.unwrap_or_default();
                Err(ExecuteError::Status { status, body })
            }
        }
    }
}
