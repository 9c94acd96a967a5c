use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::config::{Config, MAX_RESULTS_LIMIT};
use crate::research::{Lang, OutputFormat, PipelineSettings, Query};

/// Research a question: search the web, summarize each result, synthesize an answer.
///
/// Requires `TAVILY_API_KEY` (environment or `.env`) and a reachable Ollama server.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Question to research. Read from stdin when omitted; use `--` before a
    /// question that starts with a dash.
    pub query: Vec<String>,

    /// Prompt language (also the language of the answer)
    #[arg(long, value_enum, default_value_t)]
    pub lang: Lang,

    /// Ollama model name (overrides OLLAMA_MODEL)
    #[arg(long)]
    pub model: Option<String>,

    /// Number of search results to summarize (overrides RESEARCHER_MAX_RESULTS)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=MAX_RESULTS_LIMIT as i64))]
    pub max_results: Option<u8>,

    /// Results summarized at the same time
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=8))]
    pub concurrency: u8,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

impl Args {
    /// The query given on the command line, if any.
    pub fn inline_query(&self) -> Option<String> {
        (!self.query.is_empty()).then(|| self.query.join(" "))
    }

    /// The question to research: the command-line words, or else one line of
    /// `input`. `None` when that is blank, in which case nothing should run.
    pub async fn resolve_query(
        &self,
        mut input: impl AsyncBufRead + Unpin,
    ) -> std::io::Result<Option<Query>> {
        let raw = match self.inline_query() {
            Some(q) => q,
            None => {
                let mut line = String::new();
                input.read_line(&mut line).await?;
                line
            }
        };
        Ok(Query::new(&raw))
    }

    pub fn apply_to_config(&self, config: &mut Config) {
        if let Some(model) = self.model.as_ref().map(|m| m.trim()).filter(|m| !m.is_empty()) {
            config.model = model.to_string();
        }
        if let Some(n) = self.max_results {
            config.max_results = n as usize;
        }
    }

    pub fn settings(&self, config: &Config) -> PipelineSettings {
        PipelineSettings {
            summarize_concurrency: self.concurrency as usize,
            lang: self.lang,
            ..PipelineSettings::from_config(config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::from_lookup(|k| (k == "TAVILY_API_KEY").then(|| "k".to_string())).unwrap()
    }

    #[test]
    fn words_are_joined_into_one_query() {
        let args = Args::try_parse_from(["researcher", "what", "is", "rust"]).unwrap();
        assert_eq!(args.inline_query().as_deref(), Some("what is rust"));
    }

    #[test]
    fn no_words_means_stdin() {
        let args = Args::try_parse_from(["researcher"]).unwrap();
        assert!(args.inline_query().is_none());
        assert_eq!(args.lang, Lang::En);
        assert_eq!(args.format, OutputFormat::Text);
        assert_eq!(args.concurrency, 1);
    }

    #[test]
    fn flags_override_config() {
        let args = Args::try_parse_from([
            "researcher",
            "--model",
            "llama3.2",
            "--max-results",
            "5",
            "--lang",
            "ja",
            "--concurrency",
            "3",
            "--format",
            "json",
            "東京",
        ])
        .unwrap();
        let mut config = config();
        args.apply_to_config(&mut config);
        let settings = args.settings(&config);

        assert_eq!(config.model, "llama3.2");
        assert_eq!(settings.max_results, 5);
        assert_eq!(settings.summarize_concurrency, 3);
        assert_eq!(settings.lang, Lang::Ja);
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn flags_after_the_query_are_not_part_of_it() {
        let args = Args::try_parse_from([
            "researcher",
            "What is Rust?",
            "--format",
            "json",
            "--lang",
            "ja",
        ])
        .unwrap();

        assert_eq!(args.inline_query().as_deref(), Some("What is Rust?"));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.lang, Lang::Ja);
    }

    #[test]
    fn double_dash_allows_leading_dash_in_query() {
        let args = Args::try_parse_from(["researcher", "--", "-5 celsius in fahrenheit"]).unwrap();
        assert_eq!(args.inline_query().as_deref(), Some("-5 celsius in fahrenheit"));
    }

    #[tokio::test]
    async fn inline_query_ignores_stdin() {
        let args = Args::try_parse_from(["researcher", "what", "is", "rust"]).unwrap();
        let query = args.resolve_query(&b"from stdin\n"[..]).await.unwrap();
        assert_eq!(query.unwrap().as_str(), "what is rust");
    }

    #[tokio::test]
    async fn query_is_read_from_input_when_not_given() {
        let args = Args::try_parse_from(["researcher"]).unwrap();
        let query = args
            .resolve_query(&b"  What is the capital of France?\nignored\n"[..])
            .await
            .unwrap();
        assert_eq!(query.unwrap().as_str(), "What is the capital of France?");
    }

    #[tokio::test]
    async fn blank_input_resolves_to_no_query() {
        let args = Args::try_parse_from(["researcher"]).unwrap();
        for input in [&b""[..], &b"\n"[..], &b"   \t\n"[..]] {
            assert!(args.resolve_query(input).await.unwrap().is_none());
        }

        let args = Args::try_parse_from(["researcher", "  "]).unwrap();
        assert!(args.resolve_query(&b"ignored\n"[..]).await.unwrap().is_none());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(Args::try_parse_from(["researcher", "--max-results", "0", "q"]).is_err());
        assert!(Args::try_parse_from(["researcher", "--max-results", "21", "q"]).is_err());
        assert!(Args::try_parse_from(["researcher", "--concurrency", "9", "q"]).is_err());
    }
}
