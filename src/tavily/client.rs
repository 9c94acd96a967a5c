use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::types::{ErrorBody, RawResult, SearchHit, SearchRequest, SearchResponse};
use crate::config::{ApiKey, Config};

const ERROR_SNIPPET_BYTES: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Tavily rejected the API key (check TAVILY_API_KEY)")]
    Unauthorized,

    #[error("API rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("API quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("malformed search results: {0}")]
    Malformed(String),

    #[error("search timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Web search returning at most `max_results` hits in provider order.
/// Implemented by `TavilyClient` for production; mock implementations used in tests.
pub trait SearchProvider {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError>;
}

#[derive(Clone)]
pub struct TavilyClient {
    http: Client,
    api_key: ApiKey,
    base_url: String,
}

impl TavilyClient {
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            api_key: config.tavily_api_key.clone(),
            base_url: config.tavily_base_url.as_str().trim_end_matches('/').to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            api_key: ApiKey::new("test-key"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl SearchProvider for TavilyClient {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError> {
        let url = format!("{}/search", self.base_url);
        let request = SearchRequest {
            query,
            max_results,
            search_depth: "basic",
            include_answer: false,
            include_raw_content: false,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.api_key.expose())
            .header("User-Agent", crate::USER_AGENT)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let classified = classify_status(status, &text);
            warn!(status = %status, error = %classified, "Tavily API error");
            return Err(classified);
        }

        let text = response.text().await?;
        let body: SearchResponse = serde_json::from_str(&text)
            .map_err(|e| SearchError::Malformed(format!("undecodable response: {e}")))?;
        let hits = extract_hits(body, max_results)?;
        debug!(hits = hits.len(), "tavily search complete");
        Ok(hits)
    }
}

fn classify_status(status: StatusCode, body: &str) -> SearchError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .and_then(|d| d.error)
        .unwrap_or_else(|| {
            let end = body.floor_char_boundary(ERROR_SNIPPET_BYTES);
            format!("HTTP {status}: {}", &body[..end])
        });

    match status.as_u16() {
        401 => SearchError::Unauthorized,
        429 => SearchError::RateLimited,
        // Tavily's plan and key usage limits.
        432 | 433 => SearchError::QuotaExhausted(message),
        code => SearchError::Api { code, message },
    }
}

fn extract_hits(body: SearchResponse, max_results: usize) -> Result<Vec<SearchHit>, SearchError> {
    let results = body
        .results
        .ok_or_else(|| SearchError::Malformed("response has no `results` field".into()))?;

    results
        .into_iter()
        .take(max_results)
        .enumerate()
        .map(|(i, raw)| to_hit(i, raw))
        .collect()
}

fn to_hit(index: usize, raw: RawResult) -> Result<SearchHit, SearchError> {
    let RawResult {
        url,
        content,
        title,
        score,
    } = raw;
    let url = url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| SearchError::Malformed(format!("result {index} has no url")))?;
    let content =
        content.ok_or_else(|| SearchError::Malformed(format!("result {index} has no content")))?;
    Ok(SearchHit {
        url,
        content,
        title,
        score,
    })
}
