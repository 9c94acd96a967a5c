use std::env;
use std::time::Duration;

use url::Url;

const DEFAULT_TAVILY_BASE_URL: &str = "https://api.tavily.com";
const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "deepseek-r1:1.5b";
const DEFAULT_MAX_RESULTS: usize = 3;
/// Upper bound on search results per query, shared with `--max-results`.
pub const MAX_RESULTS_LIMIT: u64 = 20;
const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(30);
/// Local models on CPU can take a while per prompt.
const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("TAVILY_API_KEY not set. Get one at https://app.tavily.com")]
    MissingApiKey,

    #[error("{var} is not a valid URL: {source}")]
    InvalidUrl {
        var: &'static str,
        source: url::ParseError,
    },

    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} must be between 1 and {max}, got {value}")]
    OutOfRange {
        var: &'static str,
        value: u64,
        max: u64,
    },
}

#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub(crate) fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Process configuration, resolved once at startup.
///
/// Environment variables (a `.env` file is loaded first when present):
/// - `TAVILY_API_KEY`: required
/// - `TAVILY_BASE_URL`, `OLLAMA_BASE_URL`, `OLLAMA_MODEL`: backend overrides
/// - `RESEARCHER_MAX_RESULTS`: search results per query (default 3)
/// - `RESEARCHER_SEARCH_TIMEOUT_SECS`, `RESEARCHER_GENERATION_TIMEOUT_SECS`
#[derive(Debug, Clone)]
pub struct Config {
    pub tavily_api_key: ApiKey,
    pub tavily_base_url: Url,
    pub ollama_base_url: Url,
    pub model: String,
    pub max_results: usize,
    pub search_timeout: Duration,
    pub generation_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get("TAVILY_API_KEY").ok_or(ConfigError::MissingApiKey)?;

        let tavily_base_url = parse_url(
            "TAVILY_BASE_URL",
            get("TAVILY_BASE_URL").as_deref().unwrap_or(DEFAULT_TAVILY_BASE_URL),
        )?;
        let ollama_base_url = parse_url(
            "OLLAMA_BASE_URL",
            get("OLLAMA_BASE_URL").as_deref().unwrap_or(DEFAULT_OLLAMA_BASE_URL),
        )?;

        let max_results = match get("RESEARCHER_MAX_RESULTS") {
            Some(v) => {
                let n = parse_positive("RESEARCHER_MAX_RESULTS", &v)?;
                if n > MAX_RESULTS_LIMIT {
                    return Err(ConfigError::OutOfRange {
                        var: "RESEARCHER_MAX_RESULTS",
                        value: n,
                        max: MAX_RESULTS_LIMIT,
                    });
                }
                n as usize
            }
            None => DEFAULT_MAX_RESULTS,
        };
        let search_timeout = match get("RESEARCHER_SEARCH_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_positive("RESEARCHER_SEARCH_TIMEOUT_SECS", &v)?),
            None => DEFAULT_SEARCH_TIMEOUT,
        };
        let generation_timeout = match get("RESEARCHER_GENERATION_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_positive(
                "RESEARCHER_GENERATION_TIMEOUT_SECS",
                &v,
            )?),
            None => DEFAULT_GENERATION_TIMEOUT,
        };

        Ok(Self {
            tavily_api_key: ApiKey::new(api_key),
            tavily_base_url,
            ollama_base_url,
            model: get("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_results,
            search_timeout,
            generation_timeout,
        })
    }
}

fn parse_url(var: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { var, source })
}

fn parse_positive(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.parse::<u64>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| ConfigError::InvalidNumber {
            var,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_api_key_is_config_error() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
        assert!(err.to_string().contains("TAVILY_API_KEY"));
    }

    #[test]
    fn blank_api_key_is_config_error() {
        let err = Config::from_lookup(lookup(&[("TAVILY_API_KEY", "   ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = Config::from_lookup(lookup(&[("TAVILY_API_KEY", " tvly-abc ")])).unwrap();

        assert_eq!(config.tavily_api_key.expose(), "tvly-abc");
        assert_eq!(config.tavily_base_url.as_str(), "https://api.tavily.com/");
        assert_eq!(config.ollama_base_url.as_str(), "http://localhost:11434/");
        assert_eq!(config.model, "deepseek-r1:1.5b");
        assert_eq!(config.max_results, 3);
        assert_eq!(config.search_timeout, Duration::from_secs(30));
        assert_eq!(config.generation_timeout, Duration::from_secs(120));
    }

    #[test]
    fn overrides_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("TAVILY_API_KEY", "k"),
            ("OLLAMA_BASE_URL", "http://gpu-box:11434"),
            ("OLLAMA_MODEL", "qwen3:8b"),
            ("RESEARCHER_MAX_RESULTS", "5"),
            ("RESEARCHER_GENERATION_TIMEOUT_SECS", "300"),
        ]))
        .unwrap();

        assert_eq!(config.ollama_base_url.host_str(), Some("gpu-box"));
        assert_eq!(config.model, "qwen3:8b");
        assert_eq!(config.max_results, 5);
        assert_eq!(config.generation_timeout, Duration::from_secs(300));
    }

    #[test]
    fn invalid_url_names_the_variable() {
        let err = Config::from_lookup(lookup(&[
            ("TAVILY_API_KEY", "k"),
            ("OLLAMA_BASE_URL", "not a url"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { var: "OLLAMA_BASE_URL", .. }));
    }

    #[test]
    fn zero_or_garbage_numbers_rejected() {
        for bad in ["0", "-1", "three"] {
            let err = Config::from_lookup(lookup(&[
                ("TAVILY_API_KEY", "k"),
                ("RESEARCHER_MAX_RESULTS", bad),
            ]))
            .unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidNumber { var: "RESEARCHER_MAX_RESULTS", .. }),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn max_results_above_limit_rejected_at_startup() {
        for (raw, value) in [("21", 21), ("500", 500)] {
            let err = Config::from_lookup(lookup(&[
                ("TAVILY_API_KEY", "k"),
                ("RESEARCHER_MAX_RESULTS", raw),
            ]))
            .unwrap_err();
            assert!(
                matches!(
                    err,
                    ConfigError::OutOfRange { var: "RESEARCHER_MAX_RESULTS", value: v, max: 20 } if v == value
                ),
                "{raw} should be out of range, got: {err:?}"
            );
        }

        let config = Config::from_lookup(lookup(&[
            ("TAVILY_API_KEY", "k"),
            ("RESEARCHER_MAX_RESULTS", "20"),
        ]))
        .unwrap();
        assert_eq!(config.max_results, 20);
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = Config::from_lookup(lookup(&[("TAVILY_API_KEY", "tvly-secret")])).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("tvly-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
