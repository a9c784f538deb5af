// crates/hireflow-oracles/src/transport.rs
// ============================================================================
// Module: Live Backend Transport
// Description: Shared request/response plumbing for the live LLM backend,
//              used by every oracle client. Oracles never propagate these
//              errors to callers — a `TransportError` is always converted
//              into a deterministic fallback one layer up.
// Dependencies: reqwest, serde, serde_json, tokio
// ============================================================================

use serde::Serialize;
use serde_json::Value;

use crate::config::OracleClientConfig;

/// Failure modes of a live call. Never surfaced to pipeline callers; each
/// oracle catches this and falls back.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The call did not complete within the configured timeout.
    #[error("oracle call timed out")]
    Timeout,
    /// The HTTP request itself failed (DNS, TLS, connection reset, ...).
    #[error("oracle request failed: {0}")]
    Request(String),
    /// The backend responded with a non-success status.
    #[error("oracle backend returned status {0}")]
    Status(u16),
    /// The response body was not the shape the client expected.
    #[error("oracle response could not be parsed: {0}")]
    Parse(String),
}

/// Calls a conversational agent endpoint with free-form text input and
/// returns the agent's raw text reply. Models the REST shape of a
/// `conversations.start(agent_id=..., inputs=[...])` call.
///
/// # Errors
/// Returns [`TransportError`] on timeout, transport failure, non-success
/// status, or an unparsable response body.
pub async fn call_agent(
    client: &reqwest::Client,
    config: &OracleClientConfig,
    agent_id: &str,
    content: &str,
) -> Result<String, TransportError> {
    let body = serde_json::json!({
        "agent_id": agent_id,
        "inputs": [{ "role": "user", "content": content }],
    });
    let text = post_json(client, config, "/v1/conversations", &body).await?;
    extract_path(&text, &["outputs", "0", "content"])
}

/// Calls a chat-completion endpoint with a single user prompt, optionally
/// requesting a JSON-object response, and returns the raw text reply.
///
/// # Errors
/// Returns [`TransportError`] on timeout, transport failure, non-success
/// status, or an unparsable response body.
pub async fn call_chat(
    client: &reqwest::Client,
    config: &OracleClientConfig,
    model: &str,
    prompt: &str,
    json_mode: bool,
) -> Result<String, TransportError> {
    let mut body = serde_json::json!({
        "model": model,
        "messages": [{ "role": "user", "content": prompt }],
    });
    if json_mode {
        body["response_format"] = serde_json::json!({ "type": "json_object" });
    }
    let text = post_json(client, config, "/v1/chat/completions", &body).await?;
    extract_path(&text, &["choices", "0", "message", "content"])
}

async fn post_json<B: Serialize>(
    client: &reqwest::Client,
    config: &OracleClientConfig,
    path: &str,
    body: &B,
) -> Result<Value, TransportError> {
    let url = format!("{}{path}", config.base_url.trim_end_matches('/'));
    let api_key = config.api_key.as_deref().unwrap_or_default();

    let send = client
        .post(url)
        .bearer_auth(api_key)
        .header(reqwest::header::USER_AGENT, &config.user_agent)
        .json(body)
        .send();

    let response = tokio::time::timeout(config.timeout, send)
        .await
        .map_err(|_elapsed| TransportError::Timeout)?
        .map_err(|err| TransportError::Request(err.to_string()))?;

    if !response.status().is_success() {
        return Err(TransportError::Status(response.status().as_u16()));
    }

    response
        .json::<Value>()
        .await
        .map_err(|err| TransportError::Parse(err.to_string()))
}

fn extract_path(value: &Value, path: &[&str]) -> Result<String, TransportError> {
    let mut cursor = value;
    for segment in path {
        cursor = if let Ok(index) = segment.parse::<usize>() {
            cursor.get(index)
        } else {
            cursor.get(*segment)
        }
        .ok_or_else(|| TransportError::Parse(format!("missing field `{segment}`")))?;
    }
    cursor
        .as_str()
        .map(strip_markdown_fence)
        .map(str::to_owned)
        .ok_or_else(|| TransportError::Parse("expected a string value".to_owned()))
}

/// Strips a leading/trailing Markdown code fence (```` ``` ```` or
/// ` ```json `), mirroring the stripping every Python agent module applies
/// before parsing a model's JSON reply.
#[must_use]
pub fn strip_markdown_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.trim_start_matches(['\n', '\r']);
    rest.strip_suffix("```").map_or(rest, str::trim_end)
}
