//! Upstream match-information source.
//!
//! `MatchSource` is the seam the aggregator fetches through; production
//! uses [`BetmanClient`], tests substitute in-memory mocks. The betman
//! endpoint is a POST contract: the body carries a `schDate` day selector
//! (`YYYY.MM.DD`) or no selector at all for the upstream's single-window
//! default, and the response is one of the envelope shapes handled by
//! [`crate::normalize`].

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::BoardConfig;
use crate::error::FetchError;
use crate::normalize::extract_result_set;
use crate::retry::{retry_fetch, RetryPolicy};
use crate::types::ResultSet;

/// A source of time-windowed match result sets.
#[async_trait]
pub trait MatchSource: Send + Sync {
    /// Fetch the result set for one query window. `None` selects the
    /// upstream's parameterless single-window mode.
    async fn fetch_result_set(&self, window: Option<NaiveDate>) -> Result<ResultSet, FetchError>;
}

/// HTTP client for the betman match-information API.
pub struct BetmanClient {
    http: reqwest::Client,
    url: String,
    retry: RetryPolicy,
}

impl BetmanClient {
    /// Build a client from board configuration. The reqwest-level timeout
    /// is the per-window budget; the aggregator enforces the same bound
    /// around the whole retried fetch.
    pub fn new(config: &BoardConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.fetch_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            url: config.upstream_url.clone(),
            retry: RetryPolicy::from_env(),
        })
    }

    async fn request_once(&self, body: &Value) -> Result<ResultSet, FetchError> {
        let response = self.http.post(&self.url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        let parsed: Value = serde_json::from_str(&text)?;
        Ok(extract_result_set(&parsed))
    }
}

#[async_trait]
impl MatchSource for BetmanClient {
    async fn fetch_result_set(&self, window: Option<NaiveDate>) -> Result<ResultSet, FetchError> {
        let body = build_request_body(window);
        let op_name = window
            .map(|d| format!("fetch_{}", d.format("%Y.%m.%d")))
            .unwrap_or_else(|| "fetch_default_window".to_string());

        let set = retry_fetch(&self.retry, &op_name, || self.request_once(&body)).await?;
        debug!(
            op = %op_name,
            matches = set.matches.len(),
            snapshots = set.snapshots.len(),
            "Fetched result set"
        );
        Ok(set)
    }
}

/// Request body per the upstream contract. The nested `_sbmInfo` blob is
/// required verbatim by the endpoint.
fn build_request_body(window: Option<NaiveDate>) -> Value {
    let mut body = json!({
        "_sbmInfo": { "_sbmInfo": { "debugMode": "false" } }
    });
    if let Some(date) = window {
        body["schDate"] = Value::String(date.format("%Y.%m.%d").to_string());
    }
    body
}
