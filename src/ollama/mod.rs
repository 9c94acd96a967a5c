//! Ollama text-generation backend.

pub mod client;
pub mod types;
