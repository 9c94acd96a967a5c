use std::fmt;

use serde::Serialize;

/// A research question. Never empty or whitespace-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Query(String);

impl Query {
    /// Returns `None` for blank input; surrounding whitespace is trimmed.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// State carried through one pipeline run. Each stage only appends its own fields.
#[derive(Debug)]
pub struct ResearchRecord {
    pub query: Query,
    /// Result URLs in provider order.
    pub sources: Vec<String>,
    /// Raw result contents; `web_results[i]` came from `sources[i]`.
    pub web_results: Vec<String>,
    /// `summarized_results[i]` condenses `web_results[i]`.
    pub summarized_results: Vec<String>,
    pub response: String,
}

impl ResearchRecord {
    pub fn new(query: Query) -> Self {
        Self {
            query,
            sources: Vec::new(),
            web_results: Vec::new(),
            summarized_results: Vec::new(),
            response: String::new(),
        }
    }

    /// The caller-facing part of a completed record.
    pub fn into_output(self) -> ResearchOutput {
        ResearchOutput {
            query: self.query,
            sources: self.sources,
            response: self.response,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResearchOutput {
    pub query: Query,
    pub sources: Vec<String>,
    pub response: String,
}
