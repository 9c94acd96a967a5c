use std::time::Duration;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::debug;

use super::pipeline::{PipelineSettings, ResearchError};
use super::record::Query;
use super::sanitize::strip_reasoning;
use crate::ollama::client::{GenerationError, TextGeneration};
use crate::tavily::client::{SearchError, SearchProvider};

/// Separator between summaries in the synthesis context.
const CONTEXT_SEPARATOR: &str = "\n\n";

/// Returns `(sources, web_results)`, index-aligned, in provider order.
pub(crate) async fn search_web(
    search: &impl SearchProvider,
    query: &Query,
    settings: &PipelineSettings,
) -> Result<(Vec<String>, Vec<String>), SearchError> {
    let limit = settings.search_timeout;
    let hits = tokio::time::timeout(limit, search.search(query.as_str(), settings.max_results))
        .await
        .unwrap_or_else(|_| Err(SearchError::Timeout(limit)))?;

    for (rank, hit) in hits.iter().enumerate() {
        debug!(
            rank,
            url = %hit.url,
            title = ?hit.title,
            score = ?hit.score,
            content = %hit.content,
            "search result"
        );
    }

    Ok(hits
        .into_iter()
        .take(settings.max_results)
        .map(|hit| (hit.url, hit.content))
        .unzip())
}

/// One summary per web result, same order. The first failing item aborts the stage.
pub(crate) async fn summarize_results(
    generator: &impl TextGeneration,
    query: &Query,
    web_results: &[String],
    settings: &PipelineSettings,
) -> Result<Vec<String>, ResearchError> {
    let template = settings.lang.summary_template();
    let limit = settings.generation_timeout;

    stream::iter(web_results.iter().enumerate())
        .map(move |(index, content)| async move {
            let prompt = template.render(&[("query", query.as_str()), ("content", content.as_str())]);
            let summary = generate_within(generator, &prompt, limit)
                .await
                .map(|text| strip_reasoning(&text))
                .map_err(|source| ResearchError::Summarization { index, source })?;
            debug!(index, chars = summary.len(), "result summarized");
            Ok::<_, ResearchError>(summary)
        })
        // `buffered` yields in input order regardless of completion order.
        .buffered(settings.summarize_concurrency.max(1))
        .try_collect()
        .await
}

pub(crate) async fn synthesize_answer(
    generator: &impl TextGeneration,
    query: &Query,
    summaries: &[String],
    settings: &PipelineSettings,
) -> Result<String, GenerationError> {
    let context = summaries.join(CONTEXT_SEPARATOR);
    let prompt = settings
        .lang
        .answer_template()
        .render(&[("question", query.as_str()), ("context", context.as_str())]);

    let text = generate_within(generator, &prompt, settings.generation_timeout).await?;
    let answer = strip_reasoning(&text);
    if answer.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(answer)
}

async fn generate_within(
    generator: &impl TextGeneration,
    prompt: &str,
    limit: Duration,
) -> Result<String, GenerationError> {
    tokio::time::timeout(limit, generator.generate(prompt))
        .await
        .unwrap_or_else(|_| Err(GenerationError::Timeout(limit)))
}
