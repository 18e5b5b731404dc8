// Assessment recommendation: prompt → model → validated records.
// All model calls go through llm_client; page text comes from fetcher.

pub mod handlers;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod prompts;
