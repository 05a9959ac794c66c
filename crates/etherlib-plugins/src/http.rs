//! Blocking HTTP client shared by network data sources.
//!
//! Requests run on tokio's blocking pool so plugin hooks stay cooperative.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use tracing::debug;

/// Default request timeout for ABI lookups.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Query parameters, appended and percent-encoded by the client.
pub type Query = Vec<(&'static str, String)>;

/// Status code and body of a finished request.
#[derive(Debug, Clone)]
pub struct JsonResponse {
    pub status: u16,
    /// Parsed body, `None` when the body was not JSON.
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }
}

impl HttpClient {
    pub fn with_timeout(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .timeout_connect(timeout)
            .build();
        Self { agent }
    }

    /// GET `url` and parse the body as JSON. Non-2xx statuses are returned,
    /// not raised, so callers can map them (e.g. 404) to their own errors.
    pub async fn get_json(&self, url: &str) -> Result<JsonResponse> {
        self.get_json_with_query(url, Query::new()).await
    }

    /// Like [`get_json`](Self::get_json), with `query` appended to `url`.
    pub async fn get_json_with_query(&self, url: &str, query: Query) -> Result<JsonResponse> {
        let agent = self.agent.clone();
        let url = url.to_string();
        tokio::task::spawn_blocking(move || get_json_blocking(&agent, &url, &query))
            .await
            .context("HTTP worker task failed")?
    }
}

fn get_json_blocking(
    agent: &ureq::Agent,
    url: &str,
    query: &[(&'static str, String)],
) -> Result<JsonResponse> {
    let shown = display_url(url, query);
    debug!(url = %shown, "GET");
    let request = query
        .iter()
        .fold(agent.get(url), |request, (key, value)| request.query(key, value));
    let response = match request.call() {
        Ok(response) => response,
        Err(ureq::Error::Status(_, response)) => response,
        Err(err) => return Err(anyhow!("Request to {} failed: {}", shown, err)),
    };
    let status = response.status();
    let text = response
        .into_string()
        .with_context(|| format!("Failed to read response from {shown}"))?;
    Ok(JsonResponse {
        status,
        body: serde_json::from_str(&text).ok(),
    })
}

/// `url` with `query` appended for logs and errors, API keys hidden.
fn display_url(url: &str, query: &[(&'static str, String)]) -> String {
    let mut shown = redact_api_key(url);
    for (index, (key, value)) in query.iter().enumerate() {
        let separator = if index == 0 && !shown.contains('?') { '?' } else { '&' };
        let value = if key.eq_ignore_ascii_case("apikey") { "***" } else { value.as_str() };
        shown.push(separator);
        shown.push_str(key);
        shown.push('=');
        shown.push_str(value);
    }
    shown
}

/// Hide the value of an `apikey` query parameter.
pub fn redact_api_key(url: &str) -> String {
    match url.find("apikey=") {
        Some(start) => {
            let value_start = start + "apikey=".len();
            let value_end = url[value_start..]
                .find('&')
                .map(|offset| value_start + offset)
                .unwrap_or(url.len());
            format!("{}***{}", &url[..value_start], &url[value_end..])
        }
        None => url.to_string(),
    }
}
