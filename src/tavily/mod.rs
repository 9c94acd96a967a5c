//! Tavily web search backend.

pub mod client;
pub mod types;
