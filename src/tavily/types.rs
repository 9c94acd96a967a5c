use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
    pub max_results: usize,
    pub search_depth: &'static str,
    pub include_answer: bool,
    pub include_raw_content: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub results: Option<Vec<RawResult>>,
}

#[derive(Debug, Deserialize)]
pub struct RawResult {
    pub url: Option<String>,
    pub content: Option<String>,
    pub title: Option<String>,
    pub score: Option<f64>,
}

/// Error body shape: `{"detail": {"error": "..."}}`.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub error: Option<String>,
}

/// One search result with the fields the pipeline relies on guaranteed present.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub url: String,
    pub content: String,
    pub title: Option<String>,
    pub score: Option<f64>,
}
