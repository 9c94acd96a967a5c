use std::fmt;
use std::time::Duration;

use tracing::{info, warn};

use super::prompt::Lang;
use super::record::{Query, ResearchOutput, ResearchRecord};
use super::stages::{search_web, summarize_results, synthesize_answer};
use crate::config::Config;
use crate::ollama::client::{GenerationError, TextGeneration};
use crate::tavily::client::{SearchError, SearchProvider};

#[derive(Debug, thiserror::Error)]
pub enum ResearchError {
    #[error("search unavailable: {0}")]
    SearchUnavailable(#[source] SearchError),

    #[error("summarizing result {} failed: {source}", .index + 1)]
    Summarization {
        index: usize,
        #[source]
        source: GenerationError,
    },

    #[error("answer synthesis failed: {0}")]
    Synthesis(#[source] GenerationError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Created,
    Searched,
    Summarized,
    Synthesized,
    Done,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Created => "created",
            PipelineState::Searched => "searched",
            PipelineState::Summarized => "summarized",
            PipelineState::Synthesized => "synthesized",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub max_results: usize,
    /// Summaries generated at once. 1 means strictly one after another.
    pub summarize_concurrency: usize,
    pub lang: Lang,
    pub search_timeout: Duration,
    pub generation_timeout: Duration,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_results: config.max_results,
            summarize_concurrency: 1,
            lang: Lang::default(),
            search_timeout: config.search_timeout,
            generation_timeout: config.generation_timeout,
        }
    }
}

/// Search → Summarize → Synthesize, each stage exactly once per run.
pub struct Pipeline<S, G> {
    search: S,
    generator: G,
    settings: PipelineSettings,
}

impl<S: SearchProvider, G: TextGeneration> Pipeline<S, G> {
    pub fn new(search: S, generator: G, settings: PipelineSettings) -> Self {
        Self {
            search,
            generator,
            settings,
        }
    }

    /// Runs one query to completion. On failure only the error is returned.
    pub async fn run(&self, query: Query) -> Result<ResearchOutput, ResearchError> {
        self.execute(query).await.finish()
    }

    pub(crate) async fn execute(&self, query: Query) -> Run {
        info!(query = %query, "research started");
        let mut run = Run::new(query);
        while !run.state.is_terminal() {
            let outcome = self.step(run.state, &mut run.record).await;
            run.advance(outcome);
        }
        run
    }

    async fn step(
        &self,
        state: PipelineState,
        record: &mut ResearchRecord,
    ) -> Result<PipelineState, ResearchError> {
        match state {
            PipelineState::Created => {
                let (sources, web_results) = search_web(&self.search, &record.query, &self.settings)
                    .await
                    .map_err(ResearchError::SearchUnavailable)?;
                info!(results = sources.len(), "search complete");
                record.sources = sources;
                record.web_results = web_results;
                Ok(PipelineState::Searched)
            }
            PipelineState::Searched => {
                record.summarized_results = summarize_results(
                    &self.generator,
                    &record.query,
                    &record.web_results,
                    &self.settings,
                )
                .await?;
                Ok(PipelineState::Summarized)
            }
            PipelineState::Summarized => {
                record.response = synthesize_answer(
                    &self.generator,
                    &record.query,
                    &record.summarized_results,
                    &self.settings,
                )
                .await
                .map_err(ResearchError::Synthesis)?;
                Ok(PipelineState::Synthesized)
            }
            PipelineState::Synthesized => {
                debug_assert_eq!(record.sources.len(), record.web_results.len());
                debug_assert_eq!(record.web_results.len(), record.summarized_results.len());
                Ok(PipelineState::Done)
            }
            PipelineState::Done | PipelineState::Failed => Ok(state),
        }
    }
}

/// One in-flight run: the record, where it stands, and how it got there.
#[derive(Debug)]
pub(crate) struct Run {
    pub(crate) state: PipelineState,
    pub(crate) record: ResearchRecord,
    pub(crate) history: Vec<PipelineState>,
    pub(crate) error: Option<ResearchError>,
}

impl Run {
    fn new(query: Query) -> Self {
        Self {
            state: PipelineState::Created,
            record: ResearchRecord::new(query),
            history: vec![PipelineState::Created],
            error: None,
        }
    }

    fn advance(&mut self, outcome: Result<PipelineState, ResearchError>) {
        let next = match outcome {
            Ok(next) => next,
            Err(e) => {
                warn!(state = %self.state, error = %e, "stage failed");
                self.error = Some(e);
                PipelineState::Failed
            }
        };
        info!(from = %self.state, to = %next, "pipeline transition");
        self.state = next;
        self.history.push(next);
    }

    fn finish(self) -> Result<ResearchOutput, ResearchError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.record.into_output()),
        }
    }
}
