use clap::ValueEnum;

use super::record::ResearchOutput;
use crate::markdown::{autolink, sanitize_heading};

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Markdown answer followed by a numbered source list
    #[default]
    Text,
    /// `{"query", "sources", "response"}` as pretty-printed JSON
    Json,
}

pub fn render(output: &ResearchOutput, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(format_text(output)),
        OutputFormat::Json => serde_json::to_string_pretty(output),
    }
}

fn format_text(output: &ResearchOutput) -> String {
    let mut text = format!("# Research: {}\n\n", sanitize_heading(output.query.as_str()));
    text.push_str(output.response.trim());
    text.push_str("\n\n## Sources\n\n");

    if output.sources.is_empty() {
        text.push_str("(no sources found)\n");
    }
    for (i, url) in output.sources.iter().enumerate() {
        text.push_str(&format!("{}. {}\n", i + 1, autolink(url)));
    }
    text
}
