//! The research pipeline: search, per-result summaries, answer synthesis.

mod pipeline;
mod prompt;
mod record;
pub mod report;
mod sanitize;
mod stages;

pub use pipeline::{Pipeline, PipelineSettings};
pub use prompt::Lang;
pub use record::Query;
pub use report::OutputFormat;
